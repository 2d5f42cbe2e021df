//! Arena-backed registries for every entity kind.
//!
//! Individuals live in a single [`SlotMap`]; the living and dead indexes
//! are ordered sets of handles over that arena. An individual is never
//! removed from the arena: [`Registries::kill`] only flags them dead and
//! moves their handle from one index to the other, so parent, spouse, and
//! child links keep resolving for the whole run.
//!
//! Iteration over every index is in ascending handle order. Handles are
//! allocated in insertion order and never freed, so this is also creation
//! order, which keeps every routine deterministic for a given seed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use progenitor_types::{
    BeliefId, BeliefSystem, CalamityEvent, CalamityId, CauseOfDeath, Conflict, ConflictId,
    Discovery, DiscoveryId, Enterprise, EnterpriseId, Individual, InstitutionId, InstitutionKind,
    LearningInstitution, Lineage, LineageId, Occupation, OccupationId, PersonId, Polity, PolityId,
    Settlement, SettlementId, Sex, Tick,
};

/// Every entity of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registries {
    /// All individuals ever born, living or dead.
    pub people: SlotMap<PersonId, Individual>,
    /// Handles of living individuals.
    pub living: BTreeSet<PersonId>,
    /// Handles of dead individuals.
    pub dead: BTreeSet<PersonId>,
    /// Settlements.
    pub settlements: SlotMap<SettlementId, Settlement>,
    /// Polities.
    pub polities: SlotMap<PolityId, Polity>,
    /// Belief systems.
    pub beliefs: SlotMap<BeliefId, BeliefSystem>,
    /// Recorded discoveries.
    pub discoveries: SlotMap<DiscoveryId, Discovery>,
    /// Lineages.
    pub lineages: SlotMap<LineageId, Lineage>,
    /// Enterprises, open and closed.
    pub enterprises: SlotMap<EnterpriseId, Enterprise>,
    /// Schools and universities.
    pub institutions: SlotMap<InstitutionId, LearningInstitution>,
    /// Recorded calamities.
    pub calamities: SlotMap<CalamityId, CalamityEvent>,
    /// Conflicts, active and finished.
    pub conflicts: SlotMap<ConflictId, Conflict>,
    /// Occupation catalog; [`OccupationId`] indexes into it.
    pub occupations: Vec<Occupation>,
    /// The founding pair (male, female).
    pub founders: Option<(PersonId, PersonId)>,
    /// Years removed from everyone's effective age by discoveries.
    pub lifespan_bonus_years: u32,
}

impl Registries {
    /// Empty registries over an occupation catalog.
    pub fn new(occupations: Vec<Occupation>) -> Self {
        Self {
            occupations,
            ..Self::default()
        }
    }

    // -----------------------------------------------------------------------
    // Individuals
    // -----------------------------------------------------------------------

    /// Insert a living individual built by `make` from its new handle.
    pub fn insert_person(&mut self, make: impl FnOnce(PersonId) -> Individual) -> PersonId {
        let id = self.people.insert_with_key(make);
        if let Some(person) = self.people.get_mut(id) {
            person.id = id;
            person.alive = true;
        }
        self.living.insert(id);
        id
    }

    /// Resolve an individual, living or dead.
    pub fn person(&self, id: PersonId) -> Option<&Individual> {
        self.people.get(id)
    }

    /// Resolve an individual mutably, living or dead.
    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Individual> {
        self.people.get_mut(id)
    }

    /// Resolve a living individual.
    pub fn living_person(&self, id: PersonId) -> Option<&Individual> {
        self.person(id).filter(|p| p.alive)
    }

    /// Whether `id` is alive.
    pub fn is_alive(&self, id: PersonId) -> bool {
        self.living.contains(&id)
    }

    /// Whether `id` is one of the founding pair.
    pub fn is_founder(&self, id: PersonId) -> bool {
        self.founders.is_some_and(|(a, b)| a == id || b == id)
    }

    /// Flag an individual dead and move them to the dead index.
    ///
    /// Any pregnancy ends with the mother. Returns `false` if they were not
    /// alive. Consequences for spouses, titles, and property are applied by
    /// the death routine.
    pub fn kill(&mut self, id: PersonId, now: Tick, cause: CauseOfDeath) -> bool {
        if !self.living.remove(&id) {
            return false;
        }
        if let Some(person) = self.people.get_mut(id) {
            person.alive = false;
            person.death_tick = Some(now);
            person.cause_of_death = Some(cause);
            person.pregnancy = None;
        }
        self.dead.insert(id);
        true
    }

    /// Number of living individuals.
    pub fn living_count(&self) -> usize {
        self.living.len()
    }

    /// Living individuals in ascending handle order.
    pub fn living_people(&self) -> impl Iterator<Item = &Individual> {
        self.living.iter().filter_map(|id| self.people.get(*id))
    }

    /// Snapshot of the living handles, for passes that mutate as they go.
    pub fn living_ids(&self) -> Vec<PersonId> {
        self.living.iter().copied().collect()
    }

    /// Living individuals of `sex`.
    pub fn living_of_sex(&self, sex: Sex) -> impl Iterator<Item = &Individual> {
        self.living_people().filter(move |p| p.sex == sex)
    }

    /// Living residents of a settlement.
    pub fn residents(&self, settlement: SettlementId) -> impl Iterator<Item = &Individual> {
        self.living_people()
            .filter(move |p| p.settlement == Some(settlement))
    }

    /// Living children of `id` at or above `min_age`, oldest first.
    pub fn adult_children(&self, id: PersonId, now: Tick, min_age: u32) -> Vec<PersonId> {
        let Some(parent) = self.person(id) else {
            return Vec::new();
        };
        let mut children: Vec<&Individual> = parent
            .children
            .iter()
            .filter_map(|c| self.living_person(*c))
            .filter(|c| c.age_years(now) >= min_age)
            .collect();
        children.sort_by_key(|c| (c.birth_tick, c.id));
        children.into_iter().map(|c| c.id).collect()
    }

    // -----------------------------------------------------------------------
    // Occupations and discoveries
    // -----------------------------------------------------------------------

    /// Resolve an occupation definition.
    pub fn occupation(&self, id: OccupationId) -> Option<&Occupation> {
        self.occupations.get(id.as_index())
    }

    /// Occupation handles in catalog order.
    pub fn occupation_ids(&self) -> impl Iterator<Item = OccupationId> + '_ {
        (0..self.occupations.len()).map(|i| OccupationId(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    /// Whether a discovery of this catalog name has been recorded.
    pub fn is_discovered(&self, name: &str) -> bool {
        self.discoveries.values().any(|d| d.name == name)
    }

    /// Whether any conflict is being fought at `now`.
    pub fn has_active_conflict(&self, now: Tick) -> bool {
        self.conflicts.values().any(|c| c.is_active(now))
    }

    // -----------------------------------------------------------------------
    // World lookups
    // -----------------------------------------------------------------------

    /// Institutions of `kind` in a settlement, in founding order.
    pub fn institutions_in(
        &self,
        settlement: SettlementId,
        kind: InstitutionKind,
    ) -> impl Iterator<Item = &LearningInstitution> {
        self.institutions
            .values()
            .filter(move |i| i.settlement == settlement && i.kind == kind)
    }

    /// Number of institutions of `kind` in the world.
    pub fn institution_count(&self, kind: InstitutionKind) -> usize {
        self.institutions.values().filter(|i| i.kind == kind).count()
    }

    /// Open enterprises owned by `owner`.
    pub fn open_enterprises_of(&self, owner: PersonId) -> impl Iterator<Item = &Enterprise> {
        self.enterprises
            .values()
            .filter(move |e| e.owner == owner && e.is_open())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared builders for unit tests across the crate.

    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use progenitor_types::{
        BloodGroup, BloodType, Build, EducationStage, EyeColor, Genome, HairColor, Individual,
        Nucleotide, PersonId, Physique, RhFactor, Sex, SkinTone, Tick, Traits,
    };

    /// A plain individual with all scores at 50.
    pub fn person(sex: Sex, birth_tick: Tick) -> Individual {
        Individual {
            id: PersonId::default(),
            given_name: String::from("Test"),
            surname: String::from("Person"),
            sex,
            birth_tick,
            death_tick: None,
            cause_of_death: None,
            alive: true,
            father: None,
            mother: None,
            spouse: None,
            married_at: None,
            former_spouses: Vec::new(),
            children: Vec::new(),
            traits: Traits::uniform(50),
            physique: Physique {
                height_cm: 170,
                weight_kg: 65,
                build: Build::Average,
                eye_color: EyeColor::Brown,
                hair_color: HairColor::Brown,
                skin_tone: SkinTone::Olive,
            },
            genome: Genome {
                sequence: vec![Nucleotide::A; 32],
                blood_type: BloodType::new(BloodGroup::O, RhFactor::Positive),
                markers: BTreeSet::new(),
                conditions: BTreeSet::new(),
                has_hereditary_disease: false,
                disease_resistance: 50,
                longevity: 50,
            },
            generation: 1,
            settlement: None,
            polity: None,
            belief: None,
            occupation: None,
            occupation_since: None,
            education: EducationStage::None,
            literate: false,
            institution: None,
            pregnancy: None,
            last_birth_tick: None,
            notable: false,
            archetype: None,
            notability_reason: None,
            social_status: 0,
            wealth: Decimal::ZERO,
        }
    }

    /// Birth tick for someone `years` old at `now`.
    pub const fn born_years_ago(now: Tick, years: i64) -> Tick {
        now - years * 365
    }
}

#[cfg(test)]
mod tests {
    use progenitor_types::{CauseOfDeath, Pregnancy};

    use super::fixtures::{born_years_ago, person};
    use super::*;

    #[test]
    fn insert_assigns_handle_and_living() {
        let mut reg = Registries::default();
        let id = reg.insert_person(|_| person(Sex::Male, 0));
        assert_eq!(reg.person(id).map(|p| p.id), Some(id));
        assert!(reg.is_alive(id));
        assert_eq!(reg.living_count(), 1);
    }

    #[test]
    fn dead_remain_resolvable() {
        let mut reg = Registries::default();
        let id = reg.insert_person(|_| person(Sex::Female, 0));
        assert!(reg.kill(id, 10, CauseOfDeath::Fever));
        assert!(!reg.kill(id, 11, CauseOfDeath::Fever));
        assert!(!reg.is_alive(id));
        assert!(reg.dead.contains(&id));
        let dead = reg.person(id);
        assert!(dead.is_some_and(|p| !p.alive && p.death_tick == Some(10)));
        assert!(reg.living_person(id).is_none());
    }

    #[test]
    fn adult_children_oldest_first() {
        let now = 100 * 365;
        let mut reg = Registries::default();
        let parent = reg.insert_person(|_| person(Sex::Male, born_years_ago(now, 60)));
        let young = reg.insert_person(|_| person(Sex::Male, born_years_ago(now, 20)));
        let old = reg.insert_person(|_| person(Sex::Female, born_years_ago(now, 30)));
        let minor = reg.insert_person(|_| person(Sex::Female, born_years_ago(now, 10)));
        if let Some(p) = reg.person_mut(parent) {
            p.children = vec![young, old, minor];
        }
        assert_eq!(reg.adult_children(parent, now, 18), vec![old, young]);
    }

    #[test]
    fn death_ends_pregnancy() {
        let mut reg = Registries::default();
        let id = reg.insert_person(|_| person(Sex::Female, 0));
        if let Some(p) = reg.person_mut(id) {
            p.pregnancy = Some(Pregnancy {
                conceived_at: 0,
                due_tick: 270,
                father: None,
                litter_size: 1,
            });
        }
        assert!(reg.kill(id, 100, CauseOfDeath::Fever));
        assert!(reg.person(id).is_some_and(|p| p.pregnancy.is_none()));
    }

    #[test]
    fn json_keeps_handles_and_partition() {
        let mut reg = Registries::default();
        let father = reg.insert_person(|_| person(Sex::Male, 0));
        let gone = reg.insert_person(|_| person(Sex::Female, 0));
        let mother = reg.insert_person(|_| person(Sex::Female, 0));
        reg.kill(gone, 5, CauseOfDeath::Fever);
        reg.people.remove(gone);
        reg.dead.remove(&gone);
        let child = reg.insert_person(|_| person(Sex::Male, 10));
        if let Some(c) = reg.person_mut(child) {
            c.father = Some(father);
            c.mother = Some(mother);
        }
        reg.kill(father, 20, CauseOfDeath::OldAge);
        reg.founders = Some((father, mother));

        let json = serde_json::to_string(&reg).unwrap_or_default();
        let decoded: Registries = serde_json::from_str(&json).unwrap_or_default();

        assert_eq!(decoded.living, reg.living);
        assert_eq!(decoded.dead, reg.dead);
        assert_eq!(decoded.founders, Some((father, mother)));
        assert!(decoded.person(gone).is_none());
        let restored = decoded.person(child);
        assert!(restored.is_some_and(|c| c.father == Some(father) && c.mother == Some(mother)));
        assert!(decoded.person(father).is_some_and(|f| f.cause_of_death == Some(CauseOfDeath::OldAge)));
        assert_eq!(serde_json::to_string(&decoded).unwrap_or_default(), json);
    }
}
