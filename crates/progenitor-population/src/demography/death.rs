//! Daily mortality and the consequences of death.
//!
//! The hazard is an age-banded annual base rate evaluated on the
//! *effective* age (real age minus accumulated discovery lifespan bonus
//! minus a genetic longevity term), converted to a daily rate and scaled
//! by health, disease resistance, hereditary disease, and occupational risk.
//!
//! A death widows the surviving spouse, releases any school enrollment,
//! hands titles to the oldest adult child (or lets them lapse), and
//! passes open enterprises on the same way (or closes them).

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use progenitor_types::{
    CauseOfDeath, DAYS_PER_YEAR, EnterpriseId, EnterpriseState, EventCategory, Individual,
    Occupation, PersonId, PolityId, Tick,
};

use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::registry::Registries;

// ---------------------------------------------------------------------------
// Hazard
// ---------------------------------------------------------------------------

/// Occupational risk at or above which deaths are attributed to the job.
pub const OCCUPATIONAL_RISK_THRESHOLD: f64 = 1.5;

/// Annual probability of death at `age` before any modifiers.
pub fn annual_base_rate(age: u32) -> f64 {
    match age {
        0 => 0.03,
        1..=4 => 0.008,
        5..=14 => 0.002,
        15..=19 => 0.0015,
        20..=49 => 0.003,
        50..=69 => 0.0015f64.mul_add(f64::from(age - 50), 0.005),
        _ => 0.015f64.mul_add(f64::from(age - 70), 0.04),
    }
}

/// Age used for the hazard: real age minus the lifespan bonus minus
/// `(longevity - 50) / 10`, floored at zero.
pub fn effective_age(age: u32, lifespan_bonus_years: u32, longevity: u8) -> u32 {
    let genetic_years = (i64::from(longevity) - 50) / 10;
    let effective = i64::from(age) - i64::from(lifespan_bonus_years) - genetic_years;
    u32::try_from(effective.max(0)).unwrap_or(u32::MAX)
}

fn current_occupation<'a>(reg: &'a Registries, person: &Individual) -> Option<&'a Occupation> {
    person.occupation.and_then(|o| reg.occupation(o))
}

/// Daily probability that `person` dies at `now`, in `0.0..=1.0`.
pub fn daily_hazard(reg: &Registries, person: &Individual, now: Tick) -> f64 {
    let age = person.age_years(now);
    let effective = effective_age(age, reg.lifespan_bonus_years, person.genome.longevity);
    let health_deficit = f64::from(100_u8.saturating_sub(person.traits.health)) / 100.0;
    let resistance = f64::from(person.genome.disease_resistance.min(100)) / 100.0;
    let mut rate = annual_base_rate(effective) / DAYS_PER_YEAR as f64;
    rate *= 1.0 + health_deficit;
    rate *= 1.5 - resistance;
    if person.genome.has_hereditary_disease {
        rate *= 1.3;
    }
    if let Some(occupation) = current_occupation(reg, person) {
        rate *= occupation.death_risk.max(0.0);
    }
    rate.clamp(0.0, 1.0)
}

/// Attribute a cause of death by the fixed priority rule.
pub fn cause_of_death(
    person: &Individual,
    age: u32,
    occupation: Option<&Occupation>,
    rng: &mut impl Rng,
) -> CauseOfDeath {
    if age < 1 {
        return CauseOfDeath::InfantIllness;
    }
    if age < 15 {
        return CauseOfDeath::ChildhoodDisease;
    }
    if let Some(occupation) = occupation.filter(|o| o.death_risk >= OCCUPATIONAL_RISK_THRESHOLD) {
        return CauseOfDeath::OccupationalAccident {
            occupation: occupation.name.clone(),
        };
    }
    if person.traits.health < 30 {
        return CauseOfDeath::ChronicIllness;
    }
    if person.genome.has_hereditary_disease && rng.random_bool(0.5) {
        if let Some(condition) = person.genome.conditions.iter().find(|c| c.is_severe()) {
            return CauseOfDeath::HereditaryDisease {
                condition: *condition,
            };
        }
    }
    if age >= 80 {
        return CauseOfDeath::OldAge;
    }
    if age >= 65 {
        return CauseOfDeath::AgeRelatedIllness;
    }
    CauseOfDeath::GENERIC
        .choose(rng)
        .cloned()
        .unwrap_or(CauseOfDeath::Accident)
}

// ---------------------------------------------------------------------------
// Daily pass
// ---------------------------------------------------------------------------

/// Roll mortality for every living individual. Returns those who died.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    now: Tick,
) -> Vec<PersonId> {
    let mut died = Vec::new();
    for id in reg.living_ids() {
        let Some(person) = reg.living_person(id) else {
            continue;
        };
        let age = person.age_years(now);
        if reg.is_founder(id) && age < config.founder_immortal_below_age {
            continue;
        }
        let hazard = daily_hazard(reg, person, now);
        if !ctx.rng.random_bool(hazard) {
            continue;
        }
        let cause = cause_of_death(person, age, current_occupation(reg, person), &mut ctx.rng);
        if apply_death(reg, ctx, config, id, now, cause) {
            died.push(id);
        }
    }
    died
}

/// Kill `id` and apply every consequence. Returns `false` if they were
/// not alive.
pub fn apply_death(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    id: PersonId,
    now: Tick,
    cause: CauseOfDeath,
) -> bool {
    let Some(person) = reg.living_person(id) else {
        return false;
    };
    let name = person.full_name();
    let age = person.age_years(now);
    let spouse = person.spouse;
    let institution = person.institution;
    let description = format!("{name} died of {cause} aged {age}");
    let cause_label = cause.to_string();

    if !reg.kill(id, now, cause) {
        return false;
    }
    if let Some(spouse_id) = spouse {
        if let Some(survivor) = reg.person_mut(spouse_id) {
            if survivor.alive && survivor.spouse == Some(id) {
                survivor.spouse = None;
                survivor.former_spouses.push(id);
            }
        }
    }
    if let Some(institution_id) = institution {
        if let Some(inst) = reg.institutions.get_mut(institution_id) {
            inst.enrolled.remove(&id);
        }
        if let Some(deceased) = reg.person_mut(id) {
            deceased.institution = None;
        }
    }

    info!(tick = now, person = %id, age, cause = %cause_label, "individual died");
    ctx.record(now, EventCategory::Death, description, vec![id]);

    let heir = reg
        .adult_children(id, now, config.inheritance_min_age)
        .first()
        .copied();
    pass_titles(reg, ctx, id, heir, now);
    pass_enterprises(reg, ctx, id, heir, now);
    true
}

fn pass_titles(
    reg: &mut Registries,
    ctx: &mut SimContext,
    deceased: PersonId,
    heir: Option<PersonId>,
    now: Tick,
) {
    let ruled: Vec<PolityId> = reg
        .polities
        .iter()
        .filter(|(_, p)| p.ruler == Some(deceased))
        .map(|(pid, _)| pid)
        .collect();
    let heir_name = heir.and_then(|h| reg.person(h)).map(Individual::full_name);

    for pid in ruled {
        let Some(polity) = reg.polities.get_mut(pid) else {
            continue;
        };
        polity.ruler = heir;
        let polity_name = polity.name.clone();
        match (heir, &heir_name) {
            (Some(h), Some(heir_name)) => {
                info!(tick = now, polity = %pid, heir = %h, "rule passed to heir");
                ctx.record(
                    now,
                    EventCategory::Succession,
                    format!("{heir_name} inherited the rule of {polity_name}"),
                    vec![deceased, h],
                );
            }
            _ => {
                info!(tick = now, polity = %pid, "rule lapsed without heir");
                ctx.record(
                    now,
                    EventCategory::Succession,
                    format!("The rule of {polity_name} lapsed without an heir"),
                    vec![deceased],
                );
            }
        }
    }
    for lineage in reg.lineages.values_mut() {
        if lineage.head == Some(deceased) {
            lineage.head = heir;
        }
    }
}

fn pass_enterprises(
    reg: &mut Registries,
    ctx: &mut SimContext,
    deceased: PersonId,
    heir: Option<PersonId>,
    now: Tick,
) {
    let owned: Vec<EnterpriseId> = reg
        .enterprises
        .iter()
        .filter(|(_, e)| e.owner == deceased && e.is_open())
        .map(|(eid, _)| eid)
        .collect();
    for eid in owned {
        let Some(enterprise) = reg.enterprises.get_mut(eid) else {
            continue;
        };
        let name = enterprise.name.clone();
        if let Some(h) = heir {
            enterprise.owner = h;
            ctx.record(
                now,
                EventCategory::Enterprise,
                format!("{name} passed to a new owner"),
                vec![deceased, h],
            );
        } else {
            enterprise.state = EnterpriseState::Closed;
            enterprise.closed_at = Some(now);
            ctx.record(
                now,
                EventCategory::Enterprise,
                format!("{name} closed on the death of its owner"),
                vec![deceased],
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal::Decimal;

    use progenitor_types::{
        CauseOfDeath, Climate, Enterprise, HereditaryCondition, Polity, Settlement, SettlementId,
        Sex, Terrain,
    };

    use super::*;
    use crate::registry::fixtures::{born_years_ago, person};

    const NOW: Tick = 200 * 365;

    fn risky(risk: f64) -> Occupation {
        Occupation {
            name: String::from("Miner"),
            min_intelligence: 0,
            min_strength: 0,
            min_age: 14,
            max_age: None,
            restriction: progenitor_types::RoleRestriction::Any,
            military: false,
            base_salary: Decimal::ZERO,
            status_bonus: 0,
            death_risk: risk,
            requires_discovery: None,
        }
    }

    #[test]
    fn base_rates_by_band() {
        assert!((annual_base_rate(0) - 0.03).abs() < 1e-12);
        assert!((annual_base_rate(3) - 0.008).abs() < 1e-12);
        assert!((annual_base_rate(10) - 0.002).abs() < 1e-12);
        assert!((annual_base_rate(17) - 0.0015).abs() < 1e-12);
        assert!((annual_base_rate(30) - 0.003).abs() < 1e-12);
        assert!((annual_base_rate(60) - 0.02).abs() < 1e-12);
        assert!((annual_base_rate(72) - 0.07).abs() < 1e-12);
    }

    #[test]
    fn effective_age_applies_bonuses_and_floors() {
        assert_eq!(effective_age(70, 0, 50), 70);
        assert_eq!(effective_age(70, 5, 50), 65);
        assert_eq!(effective_age(70, 0, 100), 65);
        assert_eq!(effective_age(70, 0, 0), 75);
        assert_eq!(effective_age(2, 10, 100), 0);
    }

    #[test]
    fn hazard_grows_with_disease_and_risk() {
        let reg = Registries::new(vec![risky(2.0)]);
        let healthy = person(Sex::Male, born_years_ago(NOW, 40));
        let mut sick = healthy.clone();
        sick.genome.has_hereditary_disease = true;
        let mut miner = healthy.clone();
        miner.occupation = Some(progenitor_types::OccupationId(0));
        let base = daily_hazard(&reg, &healthy, NOW);
        assert!(daily_hazard(&reg, &sick, NOW) > base);
        assert!(daily_hazard(&reg, &miner, NOW) > base);
    }

    #[test]
    fn cause_priority() {
        let mut rng = StdRng::seed_from_u64(1);
        let adult = person(Sex::Female, 0);
        assert_eq!(cause_of_death(&adult, 0, None, &mut rng), CauseOfDeath::InfantIllness);
        assert_eq!(cause_of_death(&adult, 9, None, &mut rng), CauseOfDeath::ChildhoodDisease);
        let mine = risky(2.0);
        assert!(matches!(
            cause_of_death(&adult, 40, Some(&mine), &mut rng),
            CauseOfDeath::OccupationalAccident { .. }
        ));
        let mut frail = adult.clone();
        frail.traits.health = 10;
        assert_eq!(cause_of_death(&frail, 40, None, &mut rng), CauseOfDeath::ChronicIllness);
        assert_eq!(cause_of_death(&adult, 85, None, &mut rng), CauseOfDeath::OldAge);
        assert_eq!(cause_of_death(&adult, 70, None, &mut rng), CauseOfDeath::AgeRelatedIllness);
        let generic = cause_of_death(&adult, 30, None, &mut rng);
        assert!(CauseOfDeath::GENERIC.contains(&generic));
    }

    #[test]
    fn hereditary_cause_names_the_condition() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut carrier = person(Sex::Male, 0);
        carrier.genome.has_hereditary_disease = true;
        carrier.genome.conditions = BTreeSet::from([HereditaryCondition::Hemophilia]);
        let hereditary = (0..50)
            .map(|_| cause_of_death(&carrier, 30, None, &mut rng))
            .filter(|c| {
                matches!(
                    c,
                    CauseOfDeath::HereditaryDisease {
                        condition: HereditaryCondition::Hemophilia
                    }
                )
            })
            .count();
        assert!(hereditary > 10 && hereditary < 40);
    }

    #[test]
    fn young_founders_never_die() {
        let mut reg = Registries::default();
        let mut frail = person(Sex::Male, born_years_ago(0, 59));
        frail.traits.health = 0;
        frail.genome.disease_resistance = 0;
        frail.genome.has_hereditary_disease = true;
        let a = reg.insert_person(|_| frail.clone());
        let b = reg.insert_person(|_| person(Sex::Female, born_years_ago(0, 59)));
        reg.founders = Some((a, b));
        let mut ctx = SimContext::new(9, 100);
        let config = DemographyConfig::default();
        for day in 0..300 {
            assert!(process(&mut reg, &mut ctx, &config, day).is_empty());
        }
        assert_eq!(reg.living_count(), 2);
    }

    #[test]
    fn death_widows_spouse_and_records_event() {
        let mut reg = Registries::default();
        let husband = reg.insert_person(|_| person(Sex::Male, born_years_ago(NOW, 50)));
        let wife = reg.insert_person(|_| person(Sex::Female, born_years_ago(NOW, 48)));
        for (a, b) in [(husband, wife), (wife, husband)] {
            if let Some(p) = reg.person_mut(a) {
                p.spouse = Some(b);
            }
        }
        let mut ctx = SimContext::new(1, 100);
        let config = DemographyConfig::default();
        assert!(apply_death(&mut reg, &mut ctx, &config, husband, NOW, CauseOfDeath::Fever));
        assert!(!apply_death(&mut reg, &mut ctx, &config, husband, NOW, CauseOfDeath::Fever));

        let widow = reg.person(wife).unwrap();
        assert_eq!(widow.spouse, None);
        assert_eq!(widow.former_spouses, vec![husband]);
        assert_eq!(reg.person(husband).unwrap().death_tick, Some(NOW));
        assert_eq!(ctx.events.len(), 1);
    }

    fn settlement(reg: &mut Registries) -> SettlementId {
        reg.settlements.insert_with_key(|id| Settlement {
            id,
            name: String::from("Ashby"),
            terrain: Terrain::Plains,
            climate: Climate::Temperate,
            founder: None,
            founded_at: 0,
            population: 0,
            wealth: Decimal::ZERO,
            polity: None,
        })
    }

    #[test]
    fn rule_and_enterprise_pass_to_oldest_adult_child() {
        let mut reg = Registries::default();
        let ruler = reg.insert_person(|_| person(Sex::Male, born_years_ago(NOW, 60)));
        let minor = reg.insert_person(|_| person(Sex::Female, born_years_ago(NOW, 12)));
        let elder = reg.insert_person(|_| person(Sex::Male, born_years_ago(NOW, 30)));
        let younger = reg.insert_person(|_| person(Sex::Female, born_years_ago(NOW, 25)));
        if let Some(p) = reg.person_mut(ruler) {
            p.children = vec![minor, younger, elder];
        }
        let capital = settlement(&mut reg);
        let polity = reg.polities.insert_with_key(|id| Polity {
            id,
            name: String::from("the Ash March"),
            capital,
            ruler: Some(ruler),
            lineage: None,
            founded_at: 0,
            treasury: Decimal::ZERO,
        });
        let shop = reg.enterprises.insert_with_key(|id| Enterprise {
            id,
            name: String::from("Ashby Mill"),
            owner: ruler,
            settlement: capital,
            founded_at: 0,
            wealth: Decimal::from(100),
            reputation: 50,
            state: EnterpriseState::Stable,
            closed_at: None,
        });
        let mut ctx = SimContext::new(1, 100);
        let config = DemographyConfig::default();
        apply_death(&mut reg, &mut ctx, &config, ruler, NOW, CauseOfDeath::OldAge);
        assert_eq!(reg.polities.get(polity).unwrap().ruler, Some(elder));
        assert_eq!(reg.enterprises.get(shop).unwrap().owner, elder);
    }

    #[test]
    fn rule_lapses_and_enterprise_closes_without_heir() {
        let mut reg = Registries::default();
        let ruler = reg.insert_person(|_| person(Sex::Female, born_years_ago(NOW, 60)));
        let capital = settlement(&mut reg);
        let polity = reg.polities.insert_with_key(|id| Polity {
            id,
            name: String::from("the Green League"),
            capital,
            ruler: Some(ruler),
            lineage: None,
            founded_at: 0,
            treasury: Decimal::ZERO,
        });
        let shop = reg.enterprises.insert_with_key(|id| Enterprise {
            id,
            name: String::from("Green Smithy"),
            owner: ruler,
            settlement: capital,
            founded_at: 0,
            wealth: Decimal::ZERO,
            reputation: 50,
            state: EnterpriseState::Growing,
            closed_at: None,
        });
        let mut ctx = SimContext::new(1, 100);
        let config = DemographyConfig::default();
        apply_death(&mut reg, &mut ctx, &config, ruler, NOW, CauseOfDeath::OldAge);
        assert_eq!(reg.polities.get(polity).unwrap().ruler, None);
        let closed = reg.enterprises.get(shop).unwrap();
        assert_eq!(closed.state, EnterpriseState::Closed);
        assert_eq!(closed.closed_at, Some(NOW));
    }
}
