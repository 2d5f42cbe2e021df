//! Error types for the Progenitor binary.
//!
//! [`AppError`] wraps every failure mode during startup, the run, and
//! the final save.

use progenitor_core::config::ConfigError;
use progenitor_core::{PersistError, RunnerError};

/// Top-level error for the Progenitor binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// An existing save could not be read from disk.
    #[error("failed to read save file: {source}")]
    SaveRead {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Persisting state failed.
    #[error("persistence error: {source}")]
    Persist {
        /// The underlying persistence error.
        #[from]
        source: PersistError,
    },

    /// The driving loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },

    /// A blocking task could not be joined.
    #[error("task error: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
