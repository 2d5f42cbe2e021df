//! Configuration loading and typed config structures for the Progenitor simulation.
//!
//! The canonical configuration lives in `progenitor-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file. Every field has a
//! default, so an empty document is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use progenitor_civilization::CivilizationConfig;
use progenitor_population::{ContentCatalog, DemographyConfig, PopulationError};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configured content catalog could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    CatalogRead {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configured content catalog is invalid.
    #[error("invalid catalog: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: PopulationError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `progenitor-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// World name and random seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// The founding pair.
    #[serde(default)]
    pub founders: FoundersConfig,

    /// Daily demographic parameters.
    #[serde(default)]
    pub demography: DemographyConfig,

    /// Yearly event parameters.
    #[serde(default)]
    pub civilization: CivilizationConfig,

    /// Driving loop and persistence parameters.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed of the run's random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of recent domain events retained.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// YAML content catalog; the built-in catalog is used when absent.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl WorldConfig {
    /// Load the configured content catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CatalogRead`] if the file cannot be read, or
    /// [`ConfigError::Catalog`] if it does not parse or validate.
    pub fn load_catalog(&self) -> Result<ContentCatalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(ContentCatalog::builtin());
        };
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
            path: path.clone(),
            source,
        })?;
        Ok(ContentCatalog::from_yaml_str(&yaml)?)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            event_capacity: default_event_capacity(),
            catalog_path: None,
        }
    }
}

/// The founding pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundersConfig {
    /// Age in years of both founders at tick 0.
    #[serde(default = "default_founder_age")]
    pub age: u32,

    /// Surname of the founding man; drawn from the catalog when absent.
    #[serde(default)]
    pub male_surname: Option<String>,

    /// Surname of the founding woman; drawn from the catalog when absent.
    #[serde(default)]
    pub female_surname: Option<String>,
}

impl Default for FoundersConfig {
    fn default() -> Self {
        Self {
            age: default_founder_age(),
            male_surname: None,
            female_surname: None,
        }
    }
}

/// Driving loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Ticks run per wakeup, clamped to `1..=100`.
    #[serde(default = "default_speed")]
    pub speed: u32,

    /// Milliseconds between wakeups (0 runs flat out).
    #[serde(default = "default_wakeup_interval_ms")]
    pub wakeup_interval_ms: u64,

    /// Ticks between persistence flushes (0 disables flushing).
    #[serde(default = "default_flush_interval_ticks")]
    pub flush_interval_ticks: u64,

    /// Where the JSON file sink writes snapshots.
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            wakeup_interval_ms: default_wakeup_interval_ms(),
            flush_interval_ticks: default_flush_interval_ticks(),
            save_path: default_save_path(),
            max_ticks: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Progenitor".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_event_capacity() -> usize {
    progenitor_population::DEFAULT_EVENT_CAPACITY
}

const fn default_founder_age() -> u32 {
    20
}

const fn default_speed() -> u32 {
    1
}

const fn default_wakeup_interval_ms() -> u64 {
    100
}

const fn default_flush_interval_ticks() -> u64 {
    365
}

fn default_save_path() -> PathBuf {
    PathBuf::from("progenitor-save.json")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.event_capacity, 1000);
        assert_eq!(config.founders.age, 20);
        assert_eq!(config.runner.speed, 1);
        assert_eq!(config.runner.max_ticks, 0);
        assert_eq!(config.demography.gestation_days, 270);
        assert_eq!(config.civilization.people_per_settlement, 30);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test World"
  seed: 123
  event_capacity: 50

founders:
  age: 25
  male_surname: "Adamson"
  female_surname: "Evans"

demography:
  gestation_days: 200
  marriage_daily_chance: 0.5

civilization:
  settlement_chance: 0.9
  conflict_min_days: 10

runner:
  speed: 10
  wakeup_interval_ms: 0
  flush_interval_ticks: 30
  save_path: "/tmp/run.json"
  max_ticks: 3650

logging:
  level: "debug"
  json: true
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test World");
        assert_eq!(config.world.seed, 123);
        assert_eq!(config.founders.age, 25);
        assert_eq!(config.founders.male_surname.as_deref(), Some("Adamson"));
        assert_eq!(config.demography.gestation_days, 200);
        // Unlisted fields in a nested section keep their defaults.
        assert_eq!(config.demography.postpartum_days, 90);
        assert_eq!(config.civilization.conflict_min_days, 10);
        assert_eq!(config.runner.speed, 10);
        assert_eq!(config.runner.save_path, PathBuf::from("/tmp/run.json"));
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "world:\n  seed: 7\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.name, "Progenitor");
        assert_eq!(config.founders.age, 20);
        assert_eq!(config.runner.flush_interval_ticks, 365);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let config = SimulationConfig::parse("world: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn catalog_defaults_to_builtin() {
        let config = SimulationConfig::parse("world:\n  seed: 3\n").ok().unwrap_or_default();
        assert!(config.world.catalog_path.is_none());
        let catalog = config.world.load_catalog();
        assert_eq!(catalog.ok(), Some(ContentCatalog::builtin()));
    }

    #[test]
    fn catalog_is_read_from_the_configured_path() {
        let dir = std::env::temp_dir().join(format!("progenitor-catalog-{}", std::process::id()));
        assert!(std::fs::create_dir_all(&dir).is_ok());
        let path = dir.join("catalog.yaml");
        assert!(std::fs::write(&path, "male_names: [Odo]\nfemale_names: [Ilse]\n").is_ok());

        let yaml = format!("world:\n  catalog_path: \"{}\"\n", path.display());
        let config = SimulationConfig::parse(&yaml).ok().unwrap_or_default();
        assert_eq!(config.world.catalog_path.as_deref(), Some(path.as_path()));
        let catalog = config.world.load_catalog().ok().unwrap_or_default();
        assert_eq!(catalog.male_names, vec![String::from("Odo")]);
        assert!(catalog.discoveries.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let world = WorldConfig {
            catalog_path: Some(PathBuf::from("/nonexistent/progenitor/catalog.yaml")),
            ..WorldConfig::default()
        };
        assert!(matches!(world.load_catalog(), Err(ConfigError::CatalogRead { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("progenitor-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
