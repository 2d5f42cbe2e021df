//! Tunable parameters for the daily demographic routines.
//!
//! [`DemographyConfig`] bundles every threshold and probability used by the
//! death, education, occupation, marriage, pregnancy, and birth passes so
//! that callers (the engine, tests) can override defaults. It is embedded
//! in the top-level YAML configuration under the `demography` key; any
//! field left out of the document keeps its default.

use serde::{Deserialize, Serialize};

/// Configuration for the daily demographic processes.
///
/// Probabilities are fractions in `0.0..=1.0`; ages are whole years; all
/// durations are measured in ticks (days).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographyConfig {
    /// Founders cannot die of natural causes below this age (default: 60).
    pub founder_immortal_below_age: u32,

    /// Youngest age at which a woman can conceive (default: 15).
    pub fertile_min_age: u32,

    /// Oldest age at which a woman can conceive (default: 45).
    pub fertile_max_age: u32,

    /// Days from conception to birth (default: 270).
    pub gestation_days: i64,

    /// Days after a delivery before another conception (default: 90).
    pub postpartum_days: i64,

    /// Base chance that a pregnancy carries twins (default: 0.02).
    pub twin_chance: f64,

    /// Base chance that a pregnancy carries triplets (default: 0.001).
    pub triplet_chance: f64,

    /// Fertility above which the multiple-birth chances double (default: 80).
    pub high_fertility_threshold: u8,

    /// Minimum age to marry (default: 14).
    pub marriage_min_age: u32,

    /// Daily chance that an eligible individual looks for a spouse (default: 0.10).
    pub marriage_daily_chance: f64,

    /// Below this living population, marriage ignores locality, belief, and
    /// shared-father checks (default: 100).
    pub small_population_threshold: usize,

    /// Minimum age for employment (default: 14).
    pub min_working_age: u32,

    /// Youngest school pupil (default: 6).
    pub school_min_age: u32,

    /// Oldest school pupil (default: 15).
    pub school_max_age: u32,

    /// Youngest university student (default: 16).
    pub university_min_age: u32,

    /// Oldest university student (default: 22).
    pub university_max_age: u32,

    /// Daily literacy chance at a quality-100 institution (default: 0.01).
    pub literacy_daily_chance: f64,

    /// Institution prestige above which graduates become notable (default: 80).
    pub notable_graduation_prestige: u8,

    /// Parent intelligence at or above which newborns are evaluated for
    /// notability (default: 80).
    pub notability_parent_intelligence: u8,

    /// Age from which a child may inherit titles and enterprises (default: 18).
    pub inheritance_min_age: u32,
}

impl Default for DemographyConfig {
    fn default() -> Self {
        Self {
            founder_immortal_below_age: 60,
            fertile_min_age: 15,
            fertile_max_age: 45,
            gestation_days: 270,
            postpartum_days: 90,
            twin_chance: 0.02,
            triplet_chance: 0.001,
            high_fertility_threshold: 80,
            marriage_min_age: 14,
            marriage_daily_chance: 0.10,
            small_population_threshold: 100,
            min_working_age: 14,
            school_min_age: 6,
            school_max_age: 15,
            university_min_age: 16,
            university_max_age: 22,
            literacy_daily_chance: 0.01,
            notable_graduation_prestige: 80,
            notability_parent_intelligence: 80,
            inheritance_min_age: 18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let parsed: Result<DemographyConfig, _> =
            serde_yml::from_str("small_population_threshold: 250\n");
        let config = parsed.unwrap_or_default();
        assert_eq!(config.small_population_threshold, 250);
        assert_eq!(config.gestation_days, 270);
        assert_eq!(config.fertile_max_age, 45);
    }
}
