//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the engine with support for:
//!
//! - **Pause/resume/step**: the operator can halt the loop and advance it
//!   one day at a time
//! - **Variable speed**: ticks per wakeup adjustable at runtime
//! - **Restart**: a fresh run with a new seed, applied between ticks
//! - **Periodic persistence**: snapshots handed to a [`PersistenceSink`]
//!   on a blocking task without stalling the loop
//! - **Clean stop**: on operator request, tick limit, or when the
//!   population can no longer continue
//!
//! Every batch of ticks runs under the engine's write lock, so observers
//! holding a read lock never see a half-finished day.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use progenitor_types::{RunId, Tick};

use crate::config::RunnerConfig;
use crate::engine::{EngineError, SimulationEngine};
use crate::operator::OperatorState;
use crate::persistence::{PersistError, PersistenceSink};
use crate::stats::SimulationEndReason;

/// Errors that end the driving loop.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// The sink could not prepare storage for a run.
    #[error("persistence reset failed: {source}")]
    Reset {
        /// The underlying persistence error.
        #[from]
        source: PersistError,
    },

    /// A blocking persistence task could not be joined.
    #[error("persistence task failed: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: JoinError,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub end_reason: SimulationEndReason,
    /// Ticks executed by this call, across restarts.
    pub total_ticks: u64,
    /// The engine's next tick when the loop stopped.
    pub final_tick: Tick,
    /// Snapshots the sink accepted.
    pub flushes: u64,
    /// Flushes skipped because the previous one was still running.
    pub skipped_flushes: u64,
    /// Flushes that failed.
    pub failed_flushes: u64,
}

type FlushTask = JoinHandle<Result<(), PersistError>>;

#[derive(Debug, Default)]
struct FlushCounters {
    flushes: u64,
    skipped: u64,
    failed: u64,
}

impl FlushCounters {
    async fn collect(&mut self, task: FlushTask) {
        match task.await {
            Ok(Ok(())) => self.flushes = self.flushes.saturating_add(1),
            Ok(Err(e)) => {
                self.failed = self.failed.saturating_add(1);
                warn!(error = %e, "snapshot flush failed, retrying next interval");
            }
            Err(e) => {
                self.failed = self.failed.saturating_add(1);
                warn!(error = %e, "snapshot flush task did not complete");
            }
        }
    }
}

async fn reset_sink(sink: &Arc<dyn PersistenceSink>, run_id: RunId) -> Result<(), RunnerError> {
    let sink = Arc::clone(sink);
    tokio::task::spawn_blocking(move || sink.reset(run_id)).await??;
    Ok(())
}

/// Start a flush unless the previous one is still in flight.
async fn start_flush(
    engine: &RwLock<SimulationEngine>,
    sink: &Arc<dyn PersistenceSink>,
    in_flight: &mut Option<FlushTask>,
    counters: &mut FlushCounters,
) {
    if let Some(task) = in_flight.take() {
        if !task.is_finished() {
            counters.skipped = counters.skipped.saturating_add(1);
            debug!("previous flush still running, skipping");
            *in_flight = Some(task);
            return;
        }
        counters.collect(task).await;
    }
    let (tick, bytes) = {
        let engine = engine.read().await;
        (engine.tick_count(), engine.save_json())
    };
    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            counters.failed = counters.failed.saturating_add(1);
            warn!(tick, error = %e, "snapshot could not be serialized");
            return;
        }
    };
    let sink = Arc::clone(sink);
    *in_flight = Some(tokio::task::spawn_blocking(move || sink.flush(tick, &bytes)));
}

fn tick_limit_reached(engine: &SimulationEngine, max_ticks: u64) -> bool {
    max_ticks > 0 && u64::try_from(engine.tick_count()).is_ok_and(|t| t >= max_ticks)
}

/// Drive the engine until it ends, the tick limit is reached, or the
/// operator stops it.
///
/// The sink is reset each time a restart is applied. Resetting it for the
/// initial run is left to the caller, which knows whether the engine was
/// resumed from a save.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails or the sink cannot be reset.
/// Flush failures are logged and counted, never returned.
pub async fn run_simulation(
    engine: &RwLock<SimulationEngine>,
    operator: &OperatorState,
    sink: Arc<dyn PersistenceSink>,
    config: &RunnerConfig,
) -> Result<RunSummary, RunnerError> {
    let run_id = engine.read().await.run_id();
    info!(
        run = %run_id,
        speed = operator.speed(),
        wakeup_interval_ms = operator.wakeup_interval_ms(),
        flush_interval_ticks = config.flush_interval_ticks,
        max_ticks = config.max_ticks,
        "simulation starting"
    );

    let mut total_ticks: u64 = 0;
    let mut counters = FlushCounters::default();
    let mut in_flight: Option<FlushTask> = None;

    let end_reason = loop {
        operator.wait_for_work().await;

        if operator.is_stop_requested() {
            info!("operator stop requested");
            break SimulationEndReason::OperatorStop;
        }

        if let Some(seed) = operator.take_restart() {
            if let Some(task) = in_flight.take() {
                counters.collect(task).await;
            }
            let run_id = {
                let mut engine = engine.write().await;
                engine.restart(seed);
                engine.run_id()
            };
            reset_sink(&sink, run_id).await?;
            continue;
        }

        let batch = if operator.is_paused() {
            if !operator.take_step() {
                continue;
            }
            1
        } else {
            operator.speed()
        };

        let mut ended = None;
        let mut flush_due = false;
        {
            let mut engine = engine.write().await;
            for _ in 0..batch {
                if let Some(reason) = engine.ended() {
                    ended = Some(reason);
                    break;
                }
                if tick_limit_reached(&engine, config.max_ticks) {
                    ended = Some(SimulationEndReason::MaxTicksReached);
                    break;
                }
                let summary = engine.tick()?;
                total_ticks = total_ticks.saturating_add(1);
                let finished = u64::try_from(summary.tick.saturating_add(1)).unwrap_or(0);
                if config.flush_interval_ticks > 0
                    && finished > 0
                    && finished % config.flush_interval_ticks == 0
                {
                    flush_due = true;
                }
            }
            debug!(tick = engine.tick_count(), living = engine.registries().living_count(), "batch complete");
        }

        if flush_due {
            start_flush(engine, &sink, &mut in_flight, &mut counters).await;
        }
        if let Some(reason) = ended {
            break reason;
        }

        match operator.wakeup_interval_ms() {
            0 => tokio::task::yield_now().await,
            ms => tokio::time::sleep(std::time::Duration::from_millis(ms)).await,
        }
    };

    if let Some(task) = in_flight.take() {
        counters.collect(task).await;
    }
    operator.set_end_reason(end_reason).await;

    let summary = RunSummary {
        end_reason,
        total_ticks,
        final_tick: engine.read().await.tick_count(),
        flushes: counters.flushes,
        skipped_flushes: counters.skipped,
        failed_flushes: counters.failed,
    };
    info!(
        reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        final_tick = summary.final_tick,
        flushes = summary.flushes,
        skipped_flushes = summary.skipped_flushes,
        failed_flushes = summary.failed_flushes,
        "simulation ended"
    );
    Ok(summary)
}
