//! Delivery of due pregnancies.
//!
//! The father is resolved through a fallback chain: the recorded father
//! if he resolves in the arena (alive or dead), else the mother's current
//! spouse, else nobody. A missing father never blocks a birth; the child's
//! inheritance then draws on the mother alone.

use rand::Rng;
use tracing::info;

use rust_decimal::Decimal;

use progenitor_types::{EducationStage, EventCategory, Individual, PersonId, Sex, Tick};

use crate::catalog::ContentCatalog;
use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::genetics;
use crate::naming;
use crate::notability;
use crate::registry::Registries;

fn resolve_father(reg: &Registries, mother: &Individual) -> Option<PersonId> {
    mother
        .pregnancy
        .and_then(|p| p.father)
        .filter(|f| reg.person(*f).is_some())
        .or_else(|| mother.spouse.filter(|s| reg.person(*s).is_some()))
}

fn due_mothers(reg: &Registries, now: Tick) -> Vec<PersonId> {
    reg.living_people()
        .filter(|p| p.pregnancy.is_some_and(|preg| preg.due_tick <= now))
        .map(|p| p.id)
        .collect()
}

fn birth_child(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    catalog: &ContentCatalog,
    mother_id: PersonId,
    father_id: Option<PersonId>,
    now: Tick,
) -> Option<PersonId> {
    let mother = reg.person(mother_id)?.clone();
    let father = father_id.and_then(|f| reg.person(f)).cloned();
    let rng = &mut ctx.rng;

    let sex = if rng.random_bool(0.5) { Sex::Male } else { Sex::Female };
    let given_name = naming::given_name(catalog, sex, rng);
    let surname = father.as_ref().unwrap_or(&mother).surname.clone();
    let generation = father
        .as_ref()
        .map_or(mother.generation, |f| f.generation.max(mother.generation))
        .saturating_add(1);

    let sire = father.as_ref().unwrap_or(&mother);
    let traits = genetics::inherit_traits(&sire.traits, &mother.traits, rng);
    let genome = genetics::inherit_genome(father.as_ref().map(|f| &f.genome), &mother.genome, rng);
    let physique =
        genetics::inherit_physique(&sire.physique, &mother.physique, sex, traits.strength, rng);

    let settlement = father.as_ref().and_then(|f| f.settlement).or(mother.settlement);
    let polity = father.as_ref().and_then(|f| f.polity).or(mother.polity);
    let belief = father.as_ref().and_then(|f| f.belief).or(mother.belief);

    let gifted_parent = mother.traits.intelligence >= config.notability_parent_intelligence
        || father
            .as_ref()
            .is_some_and(|f| f.traits.intelligence >= config.notability_parent_intelligence);
    let notability = if gifted_parent {
        notability::evaluate(&traits)
    } else {
        None
    };

    let child_id = reg.insert_person(|id| Individual {
        id,
        given_name,
        surname,
        sex,
        birth_tick: now,
        death_tick: None,
        cause_of_death: None,
        alive: true,
        father: father_id,
        mother: Some(mother_id),
        spouse: None,
        married_at: None,
        former_spouses: Vec::new(),
        children: Vec::new(),
        traits,
        physique,
        genome,
        generation,
        settlement,
        polity,
        belief,
        occupation: None,
        occupation_since: None,
        education: EducationStage::None,
        literate: false,
        institution: None,
        pregnancy: None,
        last_birth_tick: None,
        notable: notability.is_some(),
        archetype: notability.as_ref().map(|n| n.archetype),
        notability_reason: notability.as_ref().map(|n| n.reason.clone()),
        social_status: 0,
        wealth: Decimal::ZERO,
    });

    for parent in [Some(mother_id), father_id].into_iter().flatten() {
        if let Some(p) = reg.person_mut(parent) {
            p.children.push(child_id);
        }
    }

    let child_name = reg.person(child_id).map(Individual::full_name).unwrap_or_default();
    if let Some(n) = &notability {
        info!(tick = now, child = %child_id, archetype = %n.archetype, "notable child born");
        ctx.record(
            now,
            EventCategory::Notability,
            format!("{child_name} was {}", n.reason),
            vec![child_id],
        );
    }
    let mut subjects = vec![child_id, mother_id];
    subjects.extend(father_id);
    ctx.record(
        now,
        EventCategory::Birth,
        format!("{child_name} was born to {}", mother.full_name()),
        subjects,
    );
    Some(child_id)
}

/// Deliver every pregnancy due at or before `now`. Returns the newborns.
///
/// Only living mothers are scanned; [`Registries::kill`] ends the
/// pregnancy of a mother who dies first.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    catalog: &ContentCatalog,
    now: Tick,
) -> Vec<PersonId> {
    let mut newborns = Vec::new();
    for mother_id in due_mothers(reg, now) {
        let Some(mother) = reg.person(mother_id) else {
            continue;
        };
        let litter = mother.pregnancy.map_or(0, |p| p.litter_size);
        let father = resolve_father(reg, mother);
        for _ in 0..litter.max(1) {
            newborns.extend(birth_child(reg, ctx, config, catalog, mother_id, father, now));
        }
        if let Some(m) = reg.person_mut(mother_id) {
            m.pregnancy = None;
            m.last_birth_tick = Some(now);
        }
    }
    newborns
}
