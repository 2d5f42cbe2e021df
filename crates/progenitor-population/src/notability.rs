//! Notable-individual detection and archetype bonuses.
//!
//! An individual can meet the thresholds of several archetypes at once.
//! Classification checks archetypes in the fixed order of
//! [`Archetype::ALL`] and the first one satisfied wins:
//!
//! 1. Scientific  (intelligence >= 90, creativity >= 70, wisdom >= 70)
//! 2. Military    (leadership >= 90, aggression >= 60, intelligence >= 70)
//! 3. Diplomatic  (charisma >= 90, wisdom >= 70, intelligence >= 70)
//! 4. Religious   (charisma >= 85, wisdom >= 85, creativity >= 70)
//! 5. Artistic    (creativity >= 90, beauty >= 70, charisma >= 70)
//! 6. Economic    (intelligence >= 85, charisma >= 80, wisdom >= 75)
//! 7. Engineering (intelligence >= 85, creativity >= 80, strength >= 70)
//! 8. Medical     (intelligence >= 85, wisdom >= 80, health >= 85)

use serde::{Deserialize, Serialize};

use progenitor_types::{Archetype, Individual, Traits};

/// The outcome of a successful notability evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notability {
    /// Matched archetype.
    pub archetype: Archetype,
    /// Human-readable reason.
    pub reason: String,
}

/// Multipliers a notable individual contributes to yearly events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeBonuses {
    /// Discovery chance multiplier.
    pub discovery_speed: f64,
    /// Military strength multiplier.
    pub military_strength: f64,
    /// Enterprise founding and yield multiplier.
    pub trade_yield: f64,
    /// Belief founding multiplier.
    pub religious_appeal: f64,
}

impl ArchetypeBonuses {
    /// No effect on anything.
    pub const NEUTRAL: Self = Self {
        discovery_speed: 1.0,
        military_strength: 1.0,
        trade_yield: 1.0,
        religious_appeal: 1.0,
    };

    /// Bonuses granted by `archetype`.
    pub const fn for_archetype(archetype: Archetype) -> Self {
        let n = Self::NEUTRAL;
        match archetype {
            Archetype::Scientific => Self {
                discovery_speed: 1.5,
                ..n
            },
            Archetype::Military => Self {
                military_strength: 1.5,
                ..n
            },
            Archetype::Diplomatic => Self {
                trade_yield: 1.2,
                ..n
            },
            Archetype::Religious => Self {
                religious_appeal: 1.5,
                ..n
            },
            Archetype::Artistic => Self {
                trade_yield: 1.1,
                religious_appeal: 1.1,
                ..n
            },
            Archetype::Economic => Self {
                trade_yield: 1.5,
                ..n
            },
            Archetype::Engineering => Self {
                discovery_speed: 1.3,
                military_strength: 1.1,
                ..n
            },
            Archetype::Medical => Self {
                discovery_speed: 1.2,
                ..n
            },
        }
    }

    /// Bonuses of an individual: their archetype's, or neutral.
    pub fn of(person: &Individual) -> Self {
        person
            .archetype
            .map_or(Self::NEUTRAL, Self::for_archetype)
    }
}

/// Whether `traits` meet the thresholds of `archetype`.
pub const fn qualifies(archetype: Archetype, t: &Traits) -> bool {
    match archetype {
        Archetype::Scientific => t.intelligence >= 90 && t.creativity >= 70 && t.wisdom >= 70,
        Archetype::Military => t.leadership >= 90 && t.aggression >= 60 && t.intelligence >= 70,
        Archetype::Diplomatic => t.charisma >= 90 && t.wisdom >= 70 && t.intelligence >= 70,
        Archetype::Religious => t.charisma >= 85 && t.wisdom >= 85 && t.creativity >= 70,
        Archetype::Artistic => t.creativity >= 90 && t.beauty >= 70 && t.charisma >= 70,
        Archetype::Economic => t.intelligence >= 85 && t.charisma >= 80 && t.wisdom >= 75,
        Archetype::Engineering => t.intelligence >= 85 && t.creativity >= 80 && t.strength >= 70,
        Archetype::Medical => t.intelligence >= 85 && t.wisdom >= 80 && t.health >= 85,
    }
}

/// Classify an individual's traits. First match in [`Archetype::ALL`] wins.
pub fn evaluate(traits: &Traits) -> Option<Notability> {
    Archetype::ALL
        .into_iter()
        .find(|a| qualifies(*a, traits))
        .map(|archetype| Notability {
            archetype,
            reason: format!("born a {archetype} genius"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_traits_are_not_notable() {
        assert!(evaluate(&Traits::uniform(60)).is_none());
    }

    #[test]
    fn maximal_traits_resolve_to_first_archetype() {
        let notability = evaluate(&Traits::uniform(100));
        assert_eq!(notability.map(|n| n.archetype), Some(Archetype::Scientific));
    }

    #[test]
    fn priority_order_is_documented_order() {
        assert_eq!(
            Archetype::ALL,
            [
                Archetype::Scientific,
                Archetype::Military,
                Archetype::Diplomatic,
                Archetype::Religious,
                Archetype::Artistic,
                Archetype::Economic,
                Archetype::Engineering,
                Archetype::Medical,
            ]
        );
    }

    #[test]
    fn overlapping_qualification_takes_earlier_archetype() {
        // Qualifies for Diplomatic, Religious, and Economic.
        let traits = Traits {
            intelligence: 86,
            charisma: 92,
            wisdom: 88,
            creativity: 72,
            ..Traits::uniform(40)
        };
        assert!(qualifies(Archetype::Religious, &traits));
        assert!(qualifies(Archetype::Economic, &traits));
        assert_eq!(evaluate(&traits).map(|n| n.archetype), Some(Archetype::Diplomatic));
    }

    #[test]
    fn medical_requires_health() {
        let mut traits = Traits {
            intelligence: 88,
            wisdom: 82,
            health: 90,
            ..Traits::uniform(30)
        };
        assert_eq!(evaluate(&traits).map(|n| n.archetype), Some(Archetype::Medical));
        traits.health = 84;
        assert!(evaluate(&traits).is_none());
    }

    #[test]
    fn military_bonus_leaves_other_multipliers_neutral() {
        let bonuses = ArchetypeBonuses::for_archetype(Archetype::Military);
        assert!(bonuses.military_strength > 1.0);
        assert!((bonuses.trade_yield - 1.0).abs() < f64::EPSILON);
    }
}
