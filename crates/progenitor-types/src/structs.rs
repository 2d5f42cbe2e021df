//! Core entity structs: individuals, world entities, catalog definitions,
//! and domain events.
//!
//! Every struct is `Serialize + Deserialize` so whole registries can be
//! snapshotted for save games and handed to a persistence sink.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{
    Archetype, BloodType, Build, CalamityKind, CauseOfDeath, Climate, DiscoveryCategory,
    EducationStage, EnterpriseState, EventCategory, EyeColor, HairColor, HereditaryCondition,
    InstitutionKind, Nucleotide, RoleRestriction, Sex, SkinTone, Terrain,
};
use crate::ids::{
    BeliefId, CalamityId, ConflictId, DiscoveryId, EnterpriseId, InstitutionId, LineageId,
    OccupationId, PersonId, PolityId, SettlementId,
};

/// One simulated day. Signed so founders can be born before tick 0.
pub type Tick = i64;

/// Number of ticks in a simulated year.
pub const DAYS_PER_YEAR: Tick = 365;

/// Whole years elapsed between two ticks, floored, never negative.
pub fn years_between(from: Tick, to: Tick) -> u32 {
    let days = to.saturating_sub(from).max(0);
    u32::try_from(days / DAYS_PER_YEAR).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Individual
// ---------------------------------------------------------------------------

/// The ten heritable trait scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
    /// Reasoning ability.
    pub intelligence: u8,
    /// Physical strength.
    pub strength: u8,
    /// General health.
    pub health: u8,
    /// Reproductive fertility.
    pub fertility: u8,
    /// Personal magnetism.
    pub charisma: u8,
    /// Inventiveness.
    pub creativity: u8,
    /// Capacity to lead.
    pub leadership: u8,
    /// Propensity for violence.
    pub aggression: u8,
    /// Judgement.
    pub wisdom: u8,
    /// Attractiveness.
    pub beauty: u8,
}

impl Traits {
    /// Traits with every score set to `value`.
    pub const fn uniform(value: u8) -> Self {
        Self {
            intelligence: value,
            strength: value,
            health: value,
            fertility: value,
            charisma: value,
            creativity: value,
            leadership: value,
            aggression: value,
            wisdom: value,
            beauty: value,
        }
    }

    /// All ten scores in declaration order.
    pub const fn as_array(&self) -> [u8; 10] {
        [
            self.intelligence,
            self.strength,
            self.health,
            self.fertility,
            self.charisma,
            self.creativity,
            self.leadership,
            self.aggression,
            self.wisdom,
            self.beauty,
        ]
    }
}

/// Physical attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physique {
    /// Adult height in centimetres.
    pub height_cm: u16,
    /// Adult weight in kilograms.
    pub weight_kg: u16,
    /// Build classification.
    pub build: Build,
    /// Eye colour.
    pub eye_color: EyeColor,
    /// Hair colour.
    pub hair_color: HairColor,
    /// Skin tone.
    pub skin_tone: SkinTone,
}

/// The genetic payload carried by an individual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    /// Fixed-length base-4 sequence.
    pub sequence: Vec<Nucleotide>,
    /// Blood type.
    pub blood_type: BloodType,
    /// Motif markers found in the sequence.
    pub markers: BTreeSet<String>,
    /// Hereditary conditions carried.
    pub conditions: BTreeSet<HereditaryCondition>,
    /// Whether any carried condition is severe.
    pub has_hereditary_disease: bool,
    /// Resistance to disease, `0..=100`.
    pub disease_resistance: u8,
    /// Genetic longevity, `0..=100`.
    pub longevity: u8,
}

/// An ongoing pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pregnancy {
    /// Tick on which the pregnancy was detected.
    pub conceived_at: Tick,
    /// Tick on which the birth is due.
    pub due_tick: Tick,
    /// The impregnating father, if known.
    pub father: Option<PersonId>,
    /// Number of children expected (1--3).
    pub litter_size: u8,
}

/// A simulated person.
///
/// Individuals are created only by the birth routine or as the founding
/// pair, and are never removed: death flags them and moves their id to
/// the dead index so genealogy keeps resolving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Arena handle.
    pub id: PersonId,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub surname: String,
    /// Biological sex.
    pub sex: Sex,
    /// Tick of birth.
    pub birth_tick: Tick,
    /// Tick of death, if dead.
    pub death_tick: Option<Tick>,
    /// Cause of death, if dead.
    pub cause_of_death: Option<CauseOfDeath>,
    /// Whether the individual is alive.
    pub alive: bool,
    /// Biological father.
    pub father: Option<PersonId>,
    /// Biological mother.
    pub mother: Option<PersonId>,
    /// Current spouse.
    pub spouse: Option<PersonId>,
    /// Tick of the current (or last) marriage.
    pub married_at: Option<Tick>,
    /// Spouses who died during the marriage.
    pub former_spouses: Vec<PersonId>,
    /// Children in birth order.
    pub children: Vec<PersonId>,
    /// Trait scores.
    pub traits: Traits,
    /// Physical attributes.
    pub physique: Physique,
    /// Genetic payload.
    pub genome: Genome,
    /// Generation number; founders are generation 0.
    pub generation: u32,
    /// Home settlement.
    pub settlement: Option<SettlementId>,
    /// Polity membership.
    pub polity: Option<PolityId>,
    /// Belief system.
    pub belief: Option<BeliefId>,
    /// Current occupation.
    pub occupation: Option<OccupationId>,
    /// Tick the current occupation was assigned.
    pub occupation_since: Option<Tick>,
    /// Highest completed education stage.
    pub education: EducationStage,
    /// Whether the individual can read and write.
    pub literate: bool,
    /// Institution currently attended.
    pub institution: Option<InstitutionId>,
    /// Ongoing pregnancy.
    pub pregnancy: Option<Pregnancy>,
    /// Tick of the last delivery.
    pub last_birth_tick: Option<Tick>,
    /// Whether the individual is notable.
    pub notable: bool,
    /// Notable archetype, if classified.
    pub archetype: Option<Archetype>,
    /// Why the individual is notable.
    pub notability_reason: Option<String>,
    /// Accumulated social status.
    pub social_status: u32,
    /// Accumulated wealth.
    pub wealth: Decimal,
}

impl Individual {
    /// "Given Surname".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.surname)
    }

    /// The tick against which age is measured: death tick if dead, else `now`.
    pub fn age_reference(&self, now: Tick) -> Tick {
        self.death_tick.unwrap_or(now)
    }

    /// Age in whole years at `now` (or at death).
    pub fn age_years(&self, now: Tick) -> u32 {
        years_between(self.birth_tick, self.age_reference(now))
    }

    /// Age in days at `now` (or at death), never negative.
    pub fn age_days(&self, now: Tick) -> Tick {
        self.age_reference(now).saturating_sub(self.birth_tick).max(0)
    }

    /// Whether `now` is a birthday (and not the day of birth).
    pub fn is_birthday(&self, now: Tick) -> bool {
        let days = self.age_days(now);
        days > 0 && days % DAYS_PER_YEAR == 0
    }

    /// Whether a pregnancy is ongoing.
    pub const fn is_pregnant(&self) -> bool {
        self.pregnancy.is_some()
    }

    /// Whether `other` is this individual's parent or child.
    pub fn is_parent_or_child_of(&self, other: &Self) -> bool {
        self.father == Some(other.id)
            || self.mother == Some(other.id)
            || other.father == Some(self.id)
            || other.mother == Some(self.id)
    }
}

// ---------------------------------------------------------------------------
// Catalog definitions
// ---------------------------------------------------------------------------

/// An occupation definition from the content catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupation {
    /// Display name.
    pub name: String,
    /// Minimum intelligence.
    #[serde(default)]
    pub min_intelligence: u8,
    /// Minimum strength.
    #[serde(default)]
    pub min_strength: u8,
    /// Minimum age in years.
    #[serde(default)]
    pub min_age: u32,
    /// Maximum age in years; holders past it retire.
    #[serde(default)]
    pub max_age: Option<u32>,
    /// Sex restriction.
    #[serde(default)]
    pub restriction: RoleRestriction,
    /// Whether the role only exists while a conflict is active.
    #[serde(default)]
    pub military: bool,
    /// Yearly salary.
    #[serde(default)]
    pub base_salary: Decimal,
    /// Status granted on assignment.
    #[serde(default)]
    pub status_bonus: u32,
    /// Death hazard multiplier while employed.
    #[serde(default = "default_risk")]
    pub death_risk: f64,
    /// Discovery that must be known before anyone can hold the role.
    #[serde(default)]
    pub requires_discovery: Option<String>,
}

const fn default_risk() -> f64 {
    1.0
}

/// A discovery definition from the content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDefinition {
    /// Unique name.
    pub name: String,
    /// Category.
    pub category: DiscoveryCategory,
    /// Minimum inventor intelligence.
    pub required_intelligence: u8,
    /// Health points granted to every living individual.
    #[serde(default)]
    pub health_bonus: u8,
    /// Years removed from everyone's effective age.
    #[serde(default)]
    pub lifespan_bonus: u8,
    /// Short description.
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// World entities
// ---------------------------------------------------------------------------

/// A settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Arena handle.
    pub id: SettlementId,
    /// Name.
    pub name: String,
    /// Terrain of the site.
    pub terrain: Terrain,
    /// Climate of the site.
    pub climate: Climate,
    /// Founder.
    pub founder: Option<PersonId>,
    /// Founding tick.
    pub founded_at: Tick,
    /// Living residents at the last recount.
    pub population: u32,
    /// Accumulated wealth.
    pub wealth: Decimal,
    /// Polity this settlement belongs to.
    pub polity: Option<PolityId>,
}

/// A polity: a political unit governing one or more settlements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polity {
    /// Arena handle.
    pub id: PolityId,
    /// Name.
    pub name: String,
    /// Capital settlement.
    pub capital: SettlementId,
    /// Current ruler; `None` once the title lapses.
    pub ruler: Option<PersonId>,
    /// Ruling lineage.
    pub lineage: Option<LineageId>,
    /// Founding tick.
    pub founded_at: Tick,
    /// Treasury.
    pub treasury: Decimal,
}

/// A belief system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefSystem {
    /// Arena handle.
    pub id: BeliefId,
    /// Name.
    pub name: String,
    /// Founder.
    pub founder: PersonId,
    /// Founding tick.
    pub founded_at: Tick,
    /// Settlement it arose in.
    pub origin: Option<SettlementId>,
    /// Living adherents at the last recount.
    pub adherents: u32,
}

/// A discovery recorded in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    /// Arena handle.
    pub id: DiscoveryId,
    /// Catalog name.
    pub name: String,
    /// Category.
    pub category: DiscoveryCategory,
    /// Inventor.
    pub inventor: PersonId,
    /// Tick of discovery.
    pub discovered_at: Tick,
    /// Health bonus applied at discovery.
    pub health_bonus: u8,
    /// Lifespan bonus in years.
    pub lifespan_bonus: u8,
    /// Description.
    pub description: String,
}

/// A named family line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// Arena handle.
    pub id: LineageId,
    /// House name.
    pub name: String,
    /// Founder.
    pub founder: PersonId,
    /// Current head.
    pub head: Option<PersonId>,
    /// Polity ruled by this lineage.
    pub polity: Option<PolityId>,
    /// Founding tick.
    pub founded_at: Tick,
    /// Accumulated prestige.
    pub prestige: u32,
}

/// A business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enterprise {
    /// Arena handle.
    pub id: EnterpriseId,
    /// Name.
    pub name: String,
    /// Owner.
    pub owner: PersonId,
    /// Settlement it operates in.
    pub settlement: SettlementId,
    /// Founding tick.
    pub founded_at: Tick,
    /// Net worth; may go negative before closure.
    pub wealth: Decimal,
    /// Reputation, `0..=100`.
    pub reputation: u8,
    /// Lifecycle state.
    pub state: EnterpriseState,
    /// Tick of closure.
    pub closed_at: Option<Tick>,
}

impl Enterprise {
    /// Whether the enterprise is still trading.
    pub fn is_open(&self) -> bool {
        self.state != EnterpriseState::Closed
    }
}

/// A school or university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningInstitution {
    /// Arena handle.
    pub id: InstitutionId,
    /// School or university.
    pub kind: InstitutionKind,
    /// Name.
    pub name: String,
    /// Host settlement.
    pub settlement: SettlementId,
    /// Founding tick.
    pub founded_at: Tick,
    /// Teaching quality, `0..=100`.
    pub quality: u8,
    /// Maximum concurrent students.
    pub capacity: u32,
    /// Prestige, `0..=100`.
    pub prestige: u8,
    /// Students currently enrolled.
    pub enrolled: BTreeSet<PersonId>,
    /// Accumulated research (universities only).
    pub research_points: u32,
    /// Number of graduates.
    pub graduates: u32,
}

impl LearningInstitution {
    /// Whether another student can be admitted.
    pub fn has_space(&self) -> bool {
        u32::try_from(self.enrolled.len()).unwrap_or(u32::MAX) < self.capacity
    }
}

/// A calamity that struck a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalamityEvent {
    /// Arena handle.
    pub id: CalamityId,
    /// Kind.
    pub kind: CalamityKind,
    /// Settlement struck.
    pub settlement: SettlementId,
    /// Tick it struck.
    pub tick: Tick,
    /// Severity, `1..=10`.
    pub severity: u8,
    /// Deaths caused.
    pub casualties: u32,
    /// Residents displaced.
    pub displaced: u32,
    /// Mitigation from known technology, percent.
    pub mitigation_pct: u8,
}

/// A conflict between two polities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Arena handle.
    pub id: ConflictId,
    /// Aggressor.
    pub attacker: PolityId,
    /// Defender.
    pub defender: PolityId,
    /// Tick the conflict began.
    pub started_at: Tick,
    /// Tick the conflict ends.
    pub ends_at: Tick,
    /// Attacker military strength.
    pub attacker_strength: u32,
    /// Defender military strength.
    pub defender_strength: u32,
    /// Attacker deaths.
    pub attacker_casualties: u32,
    /// Defender deaths.
    pub defender_casualties: u32,
    /// Victor.
    pub winner: Option<PolityId>,
}

impl Conflict {
    /// Whether the conflict is still being fought at `now`.
    pub const fn is_active(&self, now: Tick) -> bool {
        now >= self.started_at && now < self.ends_at
    }
}

// ---------------------------------------------------------------------------
// Domain events
// ---------------------------------------------------------------------------

/// An immutable record of something that happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Monotonic sequence number within a run.
    pub sequence: u64,
    /// Tick it happened on.
    pub tick: Tick,
    /// Category tag.
    pub category: EventCategory,
    /// Human-readable description.
    pub description: String,
    /// Individuals involved.
    pub subjects: Vec<PersonId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_between_floors_and_clamps() {
        assert_eq!(years_between(0, 364), 0);
        assert_eq!(years_between(0, 365), 1);
        assert_eq!(years_between(-7300, 0), 20);
        assert_eq!(years_between(100, 0), 0);
    }

    #[test]
    fn traits_array_order() {
        let mut traits = Traits::uniform(10);
        traits.beauty = 99;
        traits.intelligence = 1;
        let arr = traits.as_array();
        assert_eq!(arr.first(), Some(&1));
        assert_eq!(arr.last(), Some(&99));
    }

    #[test]
    fn conflict_activity_window() {
        let conflict = Conflict {
            id: ConflictId::default(),
            attacker: PolityId::default(),
            defender: PolityId::default(),
            started_at: 10,
            ends_at: 20,
            attacker_strength: 0,
            defender_strength: 0,
            attacker_casualties: 0,
            defender_casualties: 0,
            winner: None,
        };
        assert!(!conflict.is_active(9));
        assert!(conflict.is_active(10));
        assert!(conflict.is_active(19));
        assert!(!conflict.is_active(20));
    }
}
