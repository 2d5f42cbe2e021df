//! Yearly societal events for the Progenitor simulation.
//!
//! Everything here runs once per simulated year, on its last day, over the
//! registries owned by the population crate. No routine fails: an event
//! with no eligible agent is skipped.
//!
//! # Modules
//!
//! - [`beliefs`] -- Belief system founding and conversion
//! - [`calamities`] -- Disaster tables, mitigation, casualties, displacement
//! - [`config`] -- Chances and thresholds ([`CivilizationConfig`])
//! - [`conflicts`] -- Military strength, wars, demobilization
//! - [`discoveries`] -- Discoveries and their population-wide effects
//! - [`enterprises`] -- Enterprise founding and yearly evolution
//! - [`institutions`] -- Schools, universities, research
//! - [`payroll`] -- Salaries, settlement taxes, head counts
//! - [`polities`] -- Polity founding and ruling lineages
//! - [`select`] -- Candidate selection shared by the routines
//! - [`settlements`] -- Settlement founding and migration
//! - [`yearly`] -- The ordered yearly cycle ([`run_year`])

pub mod beliefs;
pub mod calamities;
pub mod config;
pub mod conflicts;
pub mod discoveries;
pub mod enterprises;
pub mod institutions;
pub mod payroll;
pub mod polities;
pub mod select;
pub mod settlements;
pub mod yearly;

pub use config::CivilizationConfig;
pub use yearly::{YearReport, run_year};
