//! Wars between polities.
//!
//! A polity's military strength is the sum over its adult subjects of
//! `(strength + aggression) / 2`, tripled for those in military
//! occupations, scaled by the ruler's military multiplier. Each side
//! loses 5% of the opposing strength per hundred subjects. A side
//! stronger than the other by the decisive ratio wins outright; otherwise
//! the winner is drawn weighted by strength.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use progenitor_types::{CauseOfDeath, Conflict, ConflictId, EventCategory, PersonId, PolityId, Tick};
use progenitor_population::demography::death;
use progenitor_population::{ArchetypeBonuses, DemographyConfig, OccupationIndex, Registries, SimContext};

use crate::config::CivilizationConfig;

fn subjects(reg: &Registries, polity: PolityId, now: Tick, min_age: u32) -> Vec<PersonId> {
    reg.living_people()
        .filter(|p| p.polity == Some(polity) && p.age_years(now) >= min_age)
        .map(|p| p.id)
        .collect()
}

/// Military strength of `polity` at `now`.
pub fn military_strength(reg: &Registries, config: &CivilizationConfig, polity: PolityId, now: Tick) -> u32 {
    let raw: u32 = subjects(reg, polity, now, config.adult_age)
        .iter()
        .filter_map(|id| reg.person(*id))
        .map(|p| {
            let base = (u32::from(p.traits.strength) + u32::from(p.traits.aggression)) / 2;
            let military = p
                .occupation
                .and_then(|o| reg.occupation(o))
                .is_some_and(|o| o.military);
            if military { base * 3 } else { base }
        })
        .fold(0, u32::saturating_add);
    let multiplier = reg
        .polities
        .get(polity)
        .and_then(|p| p.ruler)
        .and_then(|r| reg.living_person(r))
        .map_or(1.0, |r| ArchetypeBonuses::of(r).military_strength);
    (f64::from(raw) * multiplier).round() as u32
}

/// Casualties a side suffers from an enemy of `opposing_strength`,
/// capped at the side's own fighters.
pub fn casualties(opposing_strength: u32, fighters: usize) -> usize {
    let losses = (u64::from(opposing_strength) * 5 / 100 / 100) as usize;
    losses.min(fighters)
}

/// Winner of a battle between `attacker` and `defender` strengths:
/// `Some(true)` for the attacker, `Some(false)` for the defender, `None`
/// when neither side can fight.
pub fn decide(attacker: u32, defender: u32, ratio: f64, rng: &mut impl Rng) -> Option<bool> {
    let (a, d) = (f64::from(attacker), f64::from(defender));
    if attacker == 0 && defender == 0 {
        return None;
    }
    if a > d * ratio {
        return Some(true);
    }
    if d > a * ratio {
        return Some(false);
    }
    Some(rng.random_bool((a / (a + d)).clamp(0.0, 1.0)))
}

/// Release everyone holding a military occupation once no conflict is
/// active, and queue them for a new occupation.
pub fn demobilize(reg: &mut Registries, index: &mut OccupationIndex, now: Tick) -> Vec<PersonId> {
    if reg.has_active_conflict(now) {
        return Vec::new();
    }
    let veterans: Vec<PersonId> = reg
        .living_people()
        .filter(|p| {
            p.occupation
                .and_then(|o| reg.occupation(o))
                .is_some_and(|o| o.military)
        })
        .map(|p| p.id)
        .collect();
    for id in &veterans {
        if let Some(p) = reg.person_mut(*id) {
            p.occupation = None;
            p.occupation_since = None;
        }
        index.enqueue(*id);
    }
    veterans
}

fn at_war(reg: &Registries, a: PolityId, b: PolityId, now: Tick) -> bool {
    reg.conflicts.values().any(|c| {
        c.is_active(now)
            && ((c.attacker == a && c.defender == b) || (c.attacker == b && c.defender == a))
    })
}

fn bury(
    reg: &mut Registries,
    ctx: &mut SimContext,
    demography: &DemographyConfig,
    fighters: &[PersonId],
    count: usize,
    now: Tick,
) -> u32 {
    let fallen: Vec<PersonId> = fighters.choose_multiple(&mut ctx.rng, count).copied().collect();
    let mut dead = 0;
    for id in fallen {
        if death::apply_death(reg, ctx, demography, id, now, CauseOfDeath::Battle) {
            dead += 1;
        }
    }
    dead
}

/// Possibly start a conflict between two polities at `now`.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    demography: &DemographyConfig,
    index: &mut OccupationIndex,
    now: Tick,
) -> Option<ConflictId> {
    if reg.polities.len() < 2 || !ctx.rng.random_bool(config.conflict_chance.clamp(0.0, 1.0)) {
        return None;
    }
    let polities: Vec<PolityId> = reg.polities.keys().collect();
    let pair: Vec<PolityId> = polities.choose_multiple(&mut ctx.rng, 2).copied().collect();
    let &[attacker, defender] = pair.as_slice() else {
        return None;
    };
    if at_war(reg, attacker, defender, now) {
        return None;
    }

    let attacker_strength = military_strength(reg, config, attacker, now);
    let defender_strength = military_strength(reg, config, defender, now);
    let attacker_wins = decide(
        attacker_strength,
        defender_strength,
        config.decisive_strength_ratio,
        &mut ctx.rng,
    )?;
    let winner = if attacker_wins { attacker } else { defender };

    let attacker_fighters = subjects(reg, attacker, now, config.adult_age);
    let defender_fighters = subjects(reg, defender, now, config.adult_age);
    let attacker_losses = casualties(defender_strength, attacker_fighters.len());
    let defender_losses = casualties(attacker_strength, defender_fighters.len());
    let attacker_casualties = bury(reg, ctx, demography, &attacker_fighters, attacker_losses, now);
    let defender_casualties = bury(reg, ctx, demography, &defender_fighters, defender_losses, now);

    let min_days = config.conflict_min_days.max(1);
    let max_days = config.conflict_max_days.max(min_days);
    let duration = ctx.rng.random_range(min_days..=max_days);
    let id = reg.conflicts.insert_with_key(|id| Conflict {
        id,
        attacker,
        defender,
        started_at: now,
        ends_at: now + duration,
        attacker_strength,
        defender_strength,
        attacker_casualties,
        defender_casualties,
        winner: Some(winner),
    });
    index.requeue_idle();

    let name_of = |p: PolityId| reg.polities.get(p).map(|p| p.name.clone()).unwrap_or_default();
    let (attacker_name, defender_name, winner_name) =
        (name_of(attacker), name_of(defender), name_of(winner));
    info!(
        tick = now,
        conflict = %id,
        attacker = %attacker,
        defender = %defender,
        attacker_strength,
        defender_strength,
        duration,
        "conflict began"
    );
    ctx.record(
        now,
        EventCategory::Conflict,
        format!("{attacker_name} went to war with {defender_name}; {winner_name} will prevail"),
        Vec::new(),
    );
    Some(id)
}
