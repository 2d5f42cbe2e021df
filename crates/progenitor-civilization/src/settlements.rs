//! Settlement founding.
//!
//! A new settlement is considered once the living population reaches
//! `(settlements + 1) * people_per_settlement`. The founder is the adult
//! with the highest leadership, ties going to the oldest. The founder's
//! household moves in along with every unsettled individual; when the
//! founder already lived elsewhere, a share of that settlement follows.

use std::cmp::Reverse;

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use tracing::info;

use progenitor_types::{Climate, EventCategory, PersonId, Settlement, SettlementId, Terrain, Tick};
use progenitor_population::{ContentCatalog, Registries, SimContext, naming};

use crate::config::CivilizationConfig;
use crate::select;

/// Whether the population is dense enough for one more settlement.
pub fn density_allows(reg: &Registries, config: &CivilizationConfig) -> bool {
    let needed = reg
        .settlements
        .len()
        .saturating_add(1)
        .saturating_mul(config.people_per_settlement);
    reg.living_count() >= needed
}

/// Possibly found a settlement at `now`.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    now: Tick,
) -> Option<SettlementId> {
    if !density_allows(reg, config) || !ctx.rng.random_bool(config.settlement_chance.clamp(0.0, 1.0)) {
        return None;
    }
    let founder = select::best_by(
        select::adults(reg, now, config.settlement_founder_min_age),
        |p| (p.traits.leadership, Reverse(p.birth_tick)),
    )?;
    Some(found(reg, ctx, config, catalog, founder, now))
}

/// Found a settlement led by `founder` and move its first residents in.
pub fn found(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    founder: PersonId,
    now: Tick,
) -> SettlementId {
    let name = naming::nth_or_numbered(&catalog.settlement_names, reg.settlements.len(), "Settlement");
    let terrain = Terrain::ALL.choose(&mut ctx.rng).copied().unwrap_or(Terrain::Plains);
    let climate = Climate::ALL.choose(&mut ctx.rng).copied().unwrap_or(Climate::Temperate);
    let previous = reg.person(founder).and_then(|p| p.settlement);

    let mut movers = select::household(reg, founder);
    movers.extend(
        reg.living_people()
            .filter(|p| p.settlement.is_none())
            .map(|p| p.id),
    );
    if let Some(old) = previous {
        let household = movers.clone();
        let neighbours: Vec<PersonId> = reg
            .residents(old)
            .map(|p| p.id)
            .filter(|id| !household.contains(id))
            .collect();
        let share = neighbours.len() / config.migration_divisor.max(1);
        movers.extend(neighbours.choose_multiple(&mut ctx.rng, share).copied());
    }
    movers.sort_unstable();
    movers.dedup();

    let id = reg.settlements.insert_with_key(|id| Settlement {
        id,
        name: name.clone(),
        terrain,
        climate,
        founder: Some(founder),
        founded_at: now,
        population: u32::try_from(movers.len()).unwrap_or(u32::MAX),
        wealth: Decimal::ZERO,
        polity: None,
    });
    for mover in &movers {
        if let Some(p) = reg.person_mut(*mover) {
            p.settlement = Some(id);
            p.institution = None;
        }
    }
    for institution in reg.institutions.values_mut() {
        institution.enrolled.retain(|student| !movers.contains(student));
    }

    let founder_name = reg.person(founder).map(|p| p.full_name()).unwrap_or_default();
    info!(tick = now, settlement = %id, residents = movers.len(), "settlement founded");
    ctx.record(
        now,
        EventCategory::Settlement,
        format!("{founder_name} founded {name} with {} settlers", movers.len()),
        vec![founder],
    );
    id
}
