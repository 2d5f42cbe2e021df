//! Tunable parameters for the yearly civilization events.
//!
//! [`CivilizationConfig`] is embedded in the top-level YAML configuration
//! under the `civilization` key. Every field has a default, so a partial
//! document (or none at all) is valid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for the yearly events.
///
/// Probabilities are fractions in `0.0..=1.0` before any archetype
/// multiplier is applied; ages are whole years; durations are ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CivilizationConfig {
    /// Age at which an individual counts as an adult for yearly events (default: 18).
    pub adult_age: u32,

    /// Share of every salary collected by the earner's settlement (default: 0.10).
    pub settlement_tax_rate: Decimal,

    /// Living individuals needed per settlement before another is founded (default: 30).
    pub people_per_settlement: usize,
    /// Yearly chance of founding a settlement once the density allows (default: 0.5).
    pub settlement_chance: f64,
    /// Minimum age of a settlement founder (default: 20).
    pub settlement_founder_min_age: u32,
    /// Later settlements draw one in this many residents of the founder's
    /// previous settlement (default: 3).
    pub migration_divisor: usize,

    /// Yearly chance of founding a polity (default: 0.3).
    pub polity_chance: f64,
    /// Residents a settlement needs to become a polity's capital (default: 50).
    pub polity_min_population: usize,

    /// Yearly chance of founding a belief system, before the founder's
    /// religious appeal (default: 0.2).
    pub belief_chance: f64,
    /// Living population needed before any belief system arises (default: 20).
    pub belief_min_population: usize,
    /// Minimum intelligence, charisma, and wisdom of a belief founder (default: 60).
    pub belief_founder_min_trait: u8,
    /// One in this many unaffiliated residents converts at founding (default: 2).
    pub belief_conversion_divisor: usize,

    /// Yearly discovery chance, before the best discovery-speed multiplier (default: 0.4).
    pub discovery_chance: f64,

    /// Yearly chance of opening an enterprise, before trade yield (default: 0.3).
    pub enterprise_chance: f64,
    /// Minimum intelligence and charisma of an enterprise owner (default: 60).
    pub enterprise_owner_min_trait: u8,
    /// Capital an enterprise opens with (default: 100).
    pub enterprise_starting_wealth: Decimal,
    /// Wealth at or below which an enterprise closes (default: -50).
    pub enterprise_closure_wealth: Decimal,

    /// Yearly chance that an eligible settlement opens a school (default: 0.3).
    pub school_chance: f64,
    /// Residents a settlement needs to open a school (default: 30).
    pub school_min_population: usize,
    /// Yearly chance that an eligible settlement opens a university (default: 0.2).
    pub university_chance: f64,
    /// Residents a settlement needs to open a university (default: 100).
    pub university_min_population: usize,
    /// Wealth a settlement needs to open a university (default: 500).
    pub university_min_wealth: Decimal,
    /// Schools the world needs before any university opens (default: 2).
    pub university_min_schools: usize,
    /// Research points at which a university produces a discovery (default: 100).
    pub research_threshold: u32,

    /// Mitigation granted by each relevant discovery (default: 0.15).
    pub mitigation_per_discovery: f64,
    /// Upper bound on calamity mitigation (default: 0.60).
    pub mitigation_cap: f64,

    /// Yearly chance that two polities go to war (default: 0.15).
    pub conflict_chance: f64,
    /// Shortest conflict in days (default: 30).
    pub conflict_min_days: i64,
    /// Longest conflict in days (default: 180).
    pub conflict_max_days: i64,
    /// Strength ratio above which the stronger side wins outright (default: 1.5).
    pub decisive_strength_ratio: f64,
}

impl Default for CivilizationConfig {
    fn default() -> Self {
        Self {
            adult_age: 18,
            settlement_tax_rate: Decimal::new(10, 2),
            people_per_settlement: 30,
            settlement_chance: 0.5,
            settlement_founder_min_age: 20,
            migration_divisor: 3,
            polity_chance: 0.3,
            polity_min_population: 50,
            belief_chance: 0.2,
            belief_min_population: 20,
            belief_founder_min_trait: 60,
            belief_conversion_divisor: 2,
            discovery_chance: 0.4,
            enterprise_chance: 0.3,
            enterprise_owner_min_trait: 60,
            enterprise_starting_wealth: Decimal::from(100),
            enterprise_closure_wealth: Decimal::from(-50),
            school_chance: 0.3,
            school_min_population: 30,
            university_chance: 0.2,
            university_min_population: 100,
            university_min_wealth: Decimal::from(500),
            university_min_schools: 2,
            research_threshold: 100,
            mitigation_per_discovery: 0.15,
            mitigation_cap: 0.60,
            conflict_chance: 0.15,
            conflict_min_days: 30,
            conflict_max_days: 180,
            decisive_strength_ratio: 1.5,
        }
    }
}
