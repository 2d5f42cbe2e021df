//! Daily matchmaking.
//!
//! Iteration order is part of the contract:
//!
//! 1. The eligible pool (alive, unmarried, at or above the marriage age)
//!    is collected in ascending handle order.
//! 2. Each eligible individual is sampled with the daily marriage chance,
//!    drawing from the random stream in that same order.
//! 3. Sampled individuals are processed in ascending handle order. Each
//!    scans the opposite-sex pool in ascending handle order and marries
//!    the **first** compatible candidate still unmarried.

use rand::Rng;
use tracing::debug;

use progenitor_types::{EventCategory, Individual, PersonId, Tick};

use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::registry::Registries;

/// Whether `person` may look for a spouse at `now`.
pub fn is_eligible(person: &Individual, config: &DemographyConfig, now: Tick) -> bool {
    person.alive && person.spouse.is_none() && person.age_years(now) >= config.marriage_min_age
}

fn share_father(a: &Individual, b: &Individual) -> bool {
    a.father.is_some() && a.father == b.father
}

fn compatible_or_unset<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

/// Whether `a` and `b` may marry.
///
/// Parent/child unions are always refused. In populations at or above the
/// small-population threshold the pair must additionally share a
/// settlement and a belief (or have one of them unset), and must not share
/// a father.
pub fn compatible(a: &Individual, b: &Individual, small_population: bool) -> bool {
    if a.id == b.id || a.sex == b.sex || a.is_parent_or_child_of(b) {
        return false;
    }
    if small_population {
        return true;
    }
    compatible_or_unset(a.settlement, b.settlement)
        && compatible_or_unset(a.belief, b.belief)
        && !share_father(a, b)
}

/// Marry two individuals, setting symmetric spouse links.
pub fn marry(reg: &mut Registries, ctx: &mut SimContext, a: PersonId, b: PersonId, now: Tick) {
    let names: Vec<String> = [a, b]
        .iter()
        .filter_map(|id| reg.person(*id))
        .map(Individual::full_name)
        .collect();
    for (me, partner) in [(a, b), (b, a)] {
        if let Some(p) = reg.person_mut(me) {
            p.spouse = Some(partner);
            p.married_at = Some(now);
        }
    }
    debug!(tick = now, first = %a, second = %b, "married");
    ctx.record(
        now,
        EventCategory::Marriage,
        format!("{} married", names.join(" and ")),
        vec![a, b],
    );
}

/// Run one day of matchmaking. Returns the new couples.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    now: Tick,
) -> Vec<(PersonId, PersonId)> {
    let small_population = reg.living_count() < config.small_population_threshold;
    let pool: Vec<PersonId> = reg
        .living_people()
        .filter(|p| is_eligible(p, config, now))
        .map(|p| p.id)
        .collect();
    let chance = config.marriage_daily_chance.clamp(0.0, 1.0);
    let sampled: Vec<PersonId> = pool
        .iter()
        .copied()
        .filter(|_| ctx.rng.random_bool(chance))
        .collect();

    let mut couples = Vec::new();
    for seeker_id in sampled {
        let Some(seeker) = reg.person(seeker_id) else {
            continue;
        };
        if seeker.spouse.is_some() {
            continue;
        }
        let partner = pool.iter().copied().find(|candidate_id| {
            reg.person(*candidate_id).is_some_and(|candidate| {
                candidate.spouse.is_none() && compatible(seeker, candidate, small_population)
            })
        });
        if let Some(partner) = partner {
            marry(reg, ctx, seeker_id, partner, now);
            couples.push((seeker_id, partner));
        }
    }
    couples
}
