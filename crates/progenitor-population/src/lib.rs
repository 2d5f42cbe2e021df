//! Population lifecycle and genetics for the Progenitor simulation.
//!
//! This crate holds the logic layer for individuals: everything that
//! operates on the population without touching I/O. It sits between
//! `progenitor-types` (which defines the data structures) and the
//! civilization and core crates (which run the yearly events and drive
//! the clock).
//!
//! # Modules
//!
//! - [`catalog`] -- Static content: name pools, occupations, discoveries ([`ContentCatalog`])
//! - [`config`] -- Tunable demographic parameters ([`DemographyConfig`])
//! - [`context`] -- The random stream and event log threaded through every routine ([`SimContext`])
//! - [`demography`] -- The daily death, education, occupation, marriage, pregnancy, birth routines
//! - [`error`] -- Error types ([`PopulationError`])
//! - [`event_log`] -- Bounded recent-event buffer ([`EventLog`])
//! - [`genealogy`] -- Iterative ancestor and descendant traversal
//! - [`genetics`] -- DNA, blood type, hereditary conditions, trait inheritance
//! - [`naming`] -- Given names and surnames from the catalog pools
//! - [`notability`] -- Archetype classification and bonuses
//! - [`registry`] -- Entity arenas and the living/dead partition ([`Registries`])

pub mod catalog;
pub mod config;
pub mod context;
pub mod demography;
pub mod error;
pub mod event_log;
pub mod genealogy;
pub mod genetics;
pub mod naming;
pub mod notability;
pub mod registry;

// Re-export primary types at crate root for convenience.
pub use catalog::ContentCatalog;
pub use config::DemographyConfig;
pub use context::SimContext;
pub use demography::{DailyReport, OccupationIndex, run_day};
pub use error::PopulationError;
pub use event_log::{DEFAULT_EVENT_CAPACITY, EventLog};
pub use genealogy::{DepthMemo, GenealogyNode, GenealogyTree, build_tree};
pub use notability::{ArchetypeBonuses, Notability};
pub use registry::Registries;
