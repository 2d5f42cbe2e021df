//! Occupation assignment through an index of unemployed individuals.
//!
//! Rather than rescanning the whole catalog for the whole population each
//! day, the [`OccupationIndex`] tracks who is worth scanning:
//!
//! - `pending`: unemployed individuals not yet matched against the
//!   current set of available occupations.
//! - `idle`: individuals who were scanned and matched nothing.
//!
//! Individuals enter `pending` when they reach working age, on each
//! birthday while still unemployed, and on retirement. The whole `idle`
//! set returns to `pending` when an occupation becomes available (a
//! discovery is made or a conflict begins).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use progenitor_types::{EventCategory, Individual, Occupation, OccupationId, PersonId, Tick};

use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::registry::Registries;

/// Who to scan for employment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationIndex {
    pending: BTreeSet<PersonId>,
    idle: BTreeSet<PersonId>,
}

impl OccupationIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an individual for the next scan.
    pub fn enqueue(&mut self, id: PersonId) {
        self.idle.remove(&id);
        self.pending.insert(id);
    }

    /// Queue everyone who previously matched nothing.
    pub fn requeue_idle(&mut self) {
        let idle = std::mem::take(&mut self.idle);
        self.pending.extend(idle);
    }

    /// Rebuild from scratch: every living unemployed individual of working
    /// age is pending.
    pub fn rebuild(reg: &Registries, config: &DemographyConfig, now: Tick) -> Self {
        let pending = reg
            .living_people()
            .filter(|p| p.occupation.is_none() && p.age_years(now) >= config.min_working_age)
            .map(|p| p.id)
            .collect();
        Self {
            pending,
            idle: BTreeSet::new(),
        }
    }

    /// Individuals awaiting a scan.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Individuals who matched nothing.
    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    /// Whether `id` is waiting in either set.
    pub fn contains(&self, id: PersonId) -> bool {
        self.pending.contains(&id) || self.idle.contains(&id)
    }
}

/// Summary of one day of employment changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupationReport {
    /// Individuals given an occupation.
    pub assigned: Vec<(PersonId, OccupationId)>,
    /// Individuals who retired.
    pub retired: Vec<PersonId>,
}

/// Whether `person` may take `occupation` at `now`.
pub fn is_eligible(reg: &Registries, person: &Individual, occupation: &Occupation, now: Tick) -> bool {
    let age = person.age_years(now);
    if age < occupation.min_age || occupation.max_age.is_some_and(|max| age > max) {
        return false;
    }
    if !occupation.restriction.permits(person.sex) {
        return false;
    }
    if person.traits.intelligence < occupation.min_intelligence
        || person.traits.strength < occupation.min_strength
    {
        return false;
    }
    if let Some(required) = &occupation.requires_discovery {
        if !reg.is_discovered(required) {
            return false;
        }
    }
    !occupation.military || reg.has_active_conflict(now)
}

/// Surplus over the occupation's minimums.
pub fn fit(person: &Individual, occupation: &Occupation) -> i32 {
    let intelligence = i32::from(person.traits.intelligence) - i32::from(occupation.min_intelligence);
    let strength = i32::from(person.traits.strength) - i32::from(occupation.min_strength);
    intelligence + strength
}

/// Best eligible occupation: highest fit, ties to catalog order.
pub fn best_match(reg: &Registries, person: &Individual, now: Tick) -> Option<OccupationId> {
    let mut best: Option<(OccupationId, i32)> = None;
    for id in reg.occupation_ids() {
        let Some(occupation) = reg.occupation(id) else {
            continue;
        };
        if !is_eligible(reg, person, occupation, now) {
            continue;
        }
        let score = fit(person, occupation);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((id, score));
        }
    }
    best.map(|(id, _)| id)
}

fn should_retire(reg: &Registries, person: &Individual, now: Tick) -> bool {
    person
        .occupation
        .and_then(|o| reg.occupation(o))
        .and_then(|o| o.max_age)
        .is_some_and(|max| person.age_years(now) > max)
}

/// Retire the aged, queue newly eligible individuals, then match the
/// pending set.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    index: &mut OccupationIndex,
    now: Tick,
) -> OccupationReport {
    let mut report = OccupationReport::default();

    for id in reg.living_ids() {
        let Some(person) = reg.living_person(id) else {
            continue;
        };
        if !person.is_birthday(now) {
            continue;
        }
        if should_retire(reg, person, now) {
            let name = person.full_name();
            if let Some(p) = reg.person_mut(id) {
                p.occupation = None;
                p.occupation_since = None;
            }
            ctx.record(now, EventCategory::Occupation, format!("{name} retired"), vec![id]);
            report.retired.push(id);
            index.enqueue(id);
        } else if person.occupation.is_none() && person.age_years(now) >= config.min_working_age {
            index.enqueue(id);
        }
    }

    let pending = std::mem::take(&mut index.pending);
    for id in pending {
        let Some(person) = reg.living_person(id) else {
            continue;
        };
        if person.occupation.is_some() {
            continue;
        }
        let Some(chosen) = best_match(reg, person, now) else {
            index.idle.insert(id);
            continue;
        };
        let name = person.full_name();
        let (title, bonus) = reg
            .occupation(chosen)
            .map(|o| (o.name.clone(), o.status_bonus))
            .unwrap_or_default();
        if let Some(p) = reg.person_mut(id) {
            p.occupation = Some(chosen);
            p.occupation_since = Some(now);
            p.social_status = p.social_status.saturating_add(bonus);
        }
        debug!(tick = now, person = %id, occupation = %title, "occupation assigned");
        ctx.record(
            now,
            EventCategory::Occupation,
            format!("{name} became a {title}"),
            vec![id],
        );
        report.assigned.push((id, chosen));
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use progenitor_types::{
        Conflict, ConflictId, Discovery, DiscoveryCategory, PolityId, RoleRestriction, Sex,
    };

    use super::*;
    use crate::registry::fixtures::{born_years_ago, person};

    const NOW: Tick = 100 * 365;

    fn occupation(name: &str, min_int: u8, min_str: u8) -> Occupation {
        Occupation {
            name: name.to_owned(),
            min_intelligence: min_int,
            min_strength: min_str,
            min_age: 14,
            max_age: Some(60),
            restriction: RoleRestriction::Any,
            military: false,
            base_salary: Decimal::ONE,
            status_bonus: 2,
            death_risk: 1.0,
            requires_discovery: None,
        }
    }

    fn adult() -> Individual {
        person(Sex::Male, born_years_ago(NOW, 30) - 5)
    }

    #[test]
    fn highest_fit_wins_ties_to_catalog_order() {
        let reg = Registries::new(vec![
            occupation("Gatherer", 10, 10),
            occupation("Hunter", 10, 10),
            occupation("Scholar", 60, 0),
        ]);
        let p = adult();
        // Gatherer and Hunter tie at fit 80; Scholar is ineligible.
        assert_eq!(best_match(&reg, &p, NOW), Some(OccupationId(0)));
    }

    #[test]
    fn restriction_and_requirement_filter() {
        let mut midwife = occupation("Midwife", 0, 0);
        midwife.restriction = RoleRestriction::Female;
        let mut scribe = occupation("Scribe", 0, 0);
        scribe.requires_discovery = Some(String::from("Writing"));
        let mut soldier = occupation("Soldier", 0, 0);
        soldier.military = true;
        let reg = Registries::new(vec![midwife, scribe, soldier]);
        assert_eq!(best_match(&reg, &adult(), NOW), None);
    }

    #[test]
    fn locked_occupation_assigned_only_after_discovery() {
        let mut scribe = occupation("Scribe", 0, 0);
        scribe.requires_discovery = Some(String::from("Writing"));
        let mut reg = Registries::new(vec![scribe]);
        let id = reg.insert_person(|_| adult());
        let mut index = OccupationIndex::new();
        index.enqueue(id);
        let mut ctx = SimContext::new(1, 100);
        let config = DemographyConfig::default();

        for day in 0..5 {
            let report = process(&mut reg, &mut ctx, &config, &mut index, NOW + day);
            assert!(report.assigned.is_empty());
        }
        assert_eq!(index.idle_len(), 1);
        assert_eq!(index.pending_len(), 0);

        reg.discoveries.insert_with_key(|did| Discovery {
            id: did,
            name: String::from("Writing"),
            category: DiscoveryCategory::Science,
            inventor: id,
            discovered_at: NOW + 5,
            health_bonus: 0,
            lifespan_bonus: 0,
            description: String::new(),
        });
        index.requeue_idle();
        assert_eq!((index.pending_len(), index.idle_len()), (1, 0));
        let report = process(&mut reg, &mut ctx, &config, &mut index, NOW + 6);
        assert_eq!(report.assigned, vec![(id, OccupationId(0))]);
        let worker = reg.person(id).unwrap();
        assert_eq!(worker.occupation_since, Some(NOW + 6));
        assert_eq!(worker.social_status, 2);
    }

    #[test]
    fn military_roles_need_active_conflict() {
        let mut soldier = occupation("Soldier", 0, 0);
        soldier.military = true;
        let mut reg = Registries::new(vec![soldier]);
        let p = adult();
        assert_eq!(best_match(&reg, &p, NOW), None);
        reg.conflicts.insert_with_key(|cid: ConflictId| Conflict {
            id: cid,
            attacker: PolityId::default(),
            defender: PolityId::default(),
            started_at: NOW - 10,
            ends_at: NOW + 10,
            attacker_strength: 1,
            defender_strength: 1,
            attacker_casualties: 0,
            defender_casualties: 0,
            winner: None,
        });
        assert_eq!(best_match(&reg, &p, NOW), Some(OccupationId(0)));
        assert_eq!(best_match(&reg, &p, NOW + 10), None);
    }

    #[test]
    fn workers_retire_past_max_age_and_are_requeued() {
        let mut reg = Registries::new(vec![occupation("Farmer", 0, 0)]);
        let mut elder = person(Sex::Female, born_years_ago(NOW, 61));
        elder.occupation = Some(OccupationId(0));
        let id = reg.insert_person(|_| elder);
        let mut index = OccupationIndex::new();
        let mut ctx = SimContext::new(1, 100);
        let report = process(&mut reg, &mut ctx, &DemographyConfig::default(), &mut index, NOW);
        assert_eq!(report.retired, vec![id]);
        assert!(report.assigned.is_empty());
        assert_eq!(reg.person(id).unwrap().occupation, None);
        assert!(index.contains(id));
    }

    #[test]
    fn working_age_birthday_enqueues() {
        let mut reg = Registries::new(vec![occupation("Farmer", 0, 0)]);
        let id = reg.insert_person(|_| person(Sex::Male, born_years_ago(NOW, 14)));
        let mut index = OccupationIndex::new();
        let mut ctx = SimContext::new(1, 100);
        let report = process(&mut reg, &mut ctx, &DemographyConfig::default(), &mut index, NOW);
        assert_eq!(report.assigned, vec![(id, OccupationId(0))]);
    }

    #[test]
    fn rebuild_collects_unemployed_adults() {
        let mut reg = Registries::default();
        let adult_id = reg.insert_person(|_| adult());
        let child = reg.insert_person(|_| person(Sex::Female, born_years_ago(NOW, 5)));
        let index = OccupationIndex::rebuild(&reg, &DemographyConfig::default(), NOW);
        assert!(index.contains(adult_id));
        assert!(!index.contains(child));
    }
}
