//! Belief system founding.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use progenitor_types::{BeliefId, BeliefSystem, EventCategory, PersonId, Tick};
use progenitor_population::{ArchetypeBonuses, ContentCatalog, Registries, SimContext, naming};

use crate::config::CivilizationConfig;
use crate::select;

/// Whether another belief system may arise: fewer beliefs than
/// settlements plus one, and a large enough population.
pub fn room_for_belief(reg: &Registries, config: &CivilizationConfig) -> bool {
    reg.beliefs.len() < reg.settlements.len().saturating_add(1)
        && reg.living_count() >= config.belief_min_population
}

/// The adult with the highest combined intelligence, charisma, and wisdom,
/// each at least the configured minimum.
pub fn prophet(reg: &Registries, config: &CivilizationConfig, now: Tick) -> Option<PersonId> {
    let min = config.belief_founder_min_trait;
    select::best_by(
        select::adults(reg, now, config.adult_age).filter(|p| {
            p.belief.is_none()
                && p.traits.intelligence >= min
                && p.traits.charisma >= min
                && p.traits.wisdom >= min
        }),
        |p| {
            u32::from(p.traits.intelligence) + u32::from(p.traits.charisma) + u32::from(p.traits.wisdom)
        },
    )
}

/// Possibly found a belief system at `now`.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    now: Tick,
) -> Option<BeliefId> {
    if !room_for_belief(reg, config) {
        return None;
    }
    let founder = prophet(reg, config, now)?;
    let appeal = reg
        .person(founder)
        .map_or(1.0, |p| ArchetypeBonuses::of(p).religious_appeal);
    if !ctx.rng.random_bool((config.belief_chance * appeal).clamp(0.0, 1.0)) {
        return None;
    }

    let origin = reg.person(founder).and_then(|p| p.settlement);
    let mut converts = select::household(reg, founder);
    if let Some(settlement) = origin {
        let unaffiliated: Vec<PersonId> = reg
            .residents(settlement)
            .filter(|p| p.belief.is_none() && !converts.contains(&p.id))
            .map(|p| p.id)
            .collect();
        let share = unaffiliated.len() / config.belief_conversion_divisor.max(1);
        converts.extend(unaffiliated.choose_multiple(&mut ctx.rng, share).copied());
    }

    let name = naming::nth_or_numbered(&catalog.belief_names, reg.beliefs.len(), "Faith");
    let id = reg.beliefs.insert_with_key(|id| BeliefSystem {
        id,
        name: name.clone(),
        founder,
        founded_at: now,
        origin,
        adherents: u32::try_from(converts.len()).unwrap_or(u32::MAX),
    });
    for convert in &converts {
        if let Some(p) = reg.person_mut(*convert) {
            p.belief = Some(id);
        }
    }

    let founder_name = reg.person(founder).map(|p| p.full_name()).unwrap_or_default();
    info!(tick = now, belief = %id, adherents = converts.len(), "belief system founded");
    ctx.record(
        now,
        EventCategory::Belief,
        format!("{founder_name} began preaching {name}"),
        vec![founder],
    );
    Some(id)
}
