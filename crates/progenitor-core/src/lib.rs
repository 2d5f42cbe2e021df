//! Engine, world clock, and driving loop for the Progenitor simulation.
//!
//! This crate owns the day cycle: the daily demographic routines from
//! `progenitor-population`, then on the last day of each year the
//! civilization events from `progenitor-civilization`, then the clock.
//!
//! # Modules
//!
//! - [`clock`] -- World clock with tick counter, year, and day of year.
//! - [`config`] -- Configuration loading from `progenitor-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`SimulationEngine`], which owns all state, plus save
//!   and restore.
//! - [`operator`] -- Pause, step, speed, restart, and stop controls.
//! - [`persistence`] -- The [`PersistenceSink`] contract and built-in sinks.
//! - [`runner`] -- The async loop tying engine, operator, and sink together.
//! - [`stats`] -- Read-only [`StatisticsSnapshot`] for observers.
//!
//! [`PersistenceSink`]: persistence::PersistenceSink

pub mod clock;
pub mod config;
pub mod engine;
pub mod operator;
pub mod persistence;
pub mod runner;
pub mod stats;

pub use clock::WorldClock;
pub use config::SimulationConfig;
pub use engine::{EngineSnapshot, SimulationEngine, TickSummary};
pub use operator::OperatorState;
pub use persistence::{JsonFileSink, NullSink, PersistError, PersistenceSink};
pub use runner::{RunSummary, RunnerError, run_simulation};
pub use stats::{SimulationEndReason, StatisticsSnapshot};
