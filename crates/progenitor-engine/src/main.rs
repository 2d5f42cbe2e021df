//! Binary for the Progenitor simulation.
//!
//! This is the main entry point that wires together the engine, the
//! persistence sink, and operator controls. It loads configuration,
//! resumes from an existing save when one is present, and runs the
//! driving loop until the population ends, the tick limit is reached, or
//! the process receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `progenitor-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the content catalog and create the engine from the founding pair
//! 4. Resume from the save file, or reset it for a fresh run
//! 5. Create operator state and install the Ctrl-C handler
//! 6. Run the simulation loop
//! 7. Write a final save and log the result

mod error;

use std::path::Path;
use std::sync::Arc;

use progenitor_core::config::LoggingConfig;
use progenitor_core::{
    JsonFileSink, OperatorState, PersistenceSink, SimulationConfig, SimulationEngine,
    run_simulation,
};
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const CONFIG_PATH: &str = "progenitor-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the run, or the final save fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        speed = config.runner.speed,
        save_path = %config.runner.save_path.display(),
        "progenitor-engine starting"
    );

    // 3. Create the engine.
    let catalog = config.world.load_catalog()?;
    info!(
        catalog = %config
            .world
            .catalog_path
            .as_deref()
            .map_or_else(|| String::from("builtin"), |p| p.display().to_string()),
        occupations = catalog.occupations.len(),
        discoveries = catalog.discoveries.len(),
        "content catalog loaded"
    );
    let runner_config = config.runner.clone();
    let mut engine = SimulationEngine::new(config, catalog);

    // 4. Resume or reset.
    let sink = Arc::new(JsonFileSink::new(&runner_config.save_path));
    let resumed = resume(&mut engine, &runner_config.save_path)?;
    if !resumed {
        let sink = Arc::clone(&sink);
        let run_id = engine.run_id();
        tokio::task::spawn_blocking(move || sink.reset(run_id)).await??;
    }
    info!(
        run = %engine.run_id(),
        tick = engine.tick_count(),
        living = engine.registries().living_count(),
        resumed,
        "engine ready"
    );

    // 5. Operator state and Ctrl-C.
    let engine = Arc::new(RwLock::new(engine));
    let operator = Arc::new(OperatorState::new(&runner_config));
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current batch");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run the simulation.
    let summary = run_simulation(
        &engine,
        &operator,
        Arc::clone(&sink) as Arc<dyn PersistenceSink>,
        &runner_config,
    )
    .await?;

    // 7. Final save and results.
    let (tick, bytes) = {
        let engine = engine.read().await;
        (engine.tick_count(), engine.save_json()?)
    };
    let final_sink = Arc::clone(&sink);
    tokio::task::spawn_blocking(move || final_sink.flush(tick, &bytes)).await??;

    let stats = engine.read().await.statistics();
    if summary.end_reason.is_demographic() {
        warn!(
            reason = ?summary.end_reason,
            year = stats.year,
            "the population can no longer continue"
        );
    }
    info!(
        end_reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        final_tick = summary.final_tick,
        year = stats.year,
        living = stats.living,
        dead = stats.dead,
        max_generation = stats.max_generation,
        settlements = stats.settlements.len(),
        discoveries = stats.discoveries.len(),
        save_path = %sink.path().display(),
        "progenitor-engine shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the main simulation configuration from `progenitor-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<SimulationConfig, AppError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Replace the fresh engine with the save at `path`, if there is one.
///
/// A save that cannot be decoded is logged and ignored so the run starts
/// fresh.
fn resume(engine: &mut SimulationEngine, path: &Path) -> Result<bool, AppError> {
    if !path.exists() {
        return Ok(false);
    }
    let bytes = std::fs::read(path)?;
    Ok(engine.try_load_json(&bytes))
}
