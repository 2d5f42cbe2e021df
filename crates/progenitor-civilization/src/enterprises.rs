//! Enterprise founding and yearly evolution.
//!
//! Each year every open enterprise draws a growth rate from its state,
//! its reputation, and some noise:
//!
//! | State     | Base rate |
//! |-----------|-----------|
//! | Growing   | +15%      |
//! | Stable    | +5%       |
//! | Declining | -5%       |
//! | Failing   | -15%      |
//!
//! Wealth moves by the rate applied to the larger of its current wealth
//! and the starting capital. The rate then sets the next state, and an
//! enterprise whose wealth falls to the closure threshold shuts down.

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, info};

use progenitor_types::{Enterprise, EnterpriseId, EnterpriseState, EventCategory, PersonId, Tick};
use progenitor_population::{ArchetypeBonuses, ContentCatalog, Registries, SimContext};

use crate::config::CivilizationConfig;
use crate::select;

/// Trade name used when the catalog has none.
pub const FALLBACK_TRADE: &str = "Trading Post";

/// Base yearly growth rate of an enterprise in `state`.
pub const fn base_rate(state: EnterpriseState) -> f64 {
    match state {
        EnterpriseState::Growing => 0.15,
        EnterpriseState::Stable => 0.05,
        EnterpriseState::Declining => -0.05,
        EnterpriseState::Failing => -0.15,
        EnterpriseState::Closed => 0.0,
    }
}

/// State implied by a year's growth rate and the enterprise's reputation.
pub fn next_state(rate: f64, reputation: u8) -> EnterpriseState {
    let by_rate = if rate > 0.10 {
        EnterpriseState::Growing
    } else if rate > 0.0 {
        EnterpriseState::Stable
    } else if rate > -0.10 {
        EnterpriseState::Declining
    } else {
        EnterpriseState::Failing
    };
    if reputation < 20 && matches!(by_rate, EnterpriseState::Growing | EnterpriseState::Stable) {
        EnterpriseState::Declining
    } else {
        by_rate
    }
}

/// Summary of one year of enterprise activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnterpriseReport {
    /// Enterprises opened this year.
    pub opened: Option<EnterpriseId>,
    /// Enterprises that closed this year.
    pub closed: Vec<EnterpriseId>,
}

/// Evolve every open enterprise by one year.
pub fn evolve(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    now: Tick,
) -> Vec<EnterpriseId> {
    let open: Vec<EnterpriseId> = reg
        .enterprises
        .iter()
        .filter(|(_, e)| e.is_open())
        .map(|(id, _)| id)
        .collect();
    let mut closed = Vec::new();
    for id in open {
        let Some(enterprise) = reg.enterprises.get_mut(id) else {
            continue;
        };
        let noise: f64 = ctx.rng.random_range(-0.10..=0.10);
        let reputation_term = (f64::from(enterprise.reputation) - 50.0) / 500.0;
        let rate = base_rate(enterprise.state) + reputation_term + noise;

        let scale = enterprise.wealth.max(config.enterprise_starting_wealth);
        let delta = Decimal::from_f64(rate).map_or(Decimal::ZERO, |r| (scale * r).round_dp(2));
        enterprise.wealth += delta;
        let swing: u8 = ctx.rng.random_range(0..=3);
        enterprise.reputation = if rate > 0.0 {
            enterprise.reputation.saturating_add(swing).min(100)
        } else {
            enterprise.reputation.saturating_sub(swing)
        };

        let previous = enterprise.state;
        if enterprise.wealth <= config.enterprise_closure_wealth {
            enterprise.state = EnterpriseState::Closed;
            enterprise.closed_at = Some(now);
        } else {
            enterprise.state = next_state(rate, enterprise.reputation);
        }
        let (name, owner, state) = (enterprise.name.clone(), enterprise.owner, enterprise.state);
        if state == previous {
            continue;
        }
        debug!(tick = now, enterprise = %id, ?previous, ?state, "enterprise state changed");
        if state == EnterpriseState::Closed {
            info!(tick = now, enterprise = %id, "enterprise closed");
            ctx.record(now, EventCategory::Enterprise, format!("{name} closed its doors"), vec![owner]);
            closed.push(id);
        }
    }
    closed
}

/// The best-qualified adult resident who owns nothing open yet.
pub fn prospective_owner(reg: &Registries, config: &CivilizationConfig, now: Tick) -> Option<PersonId> {
    let min = config.enterprise_owner_min_trait;
    select::best_by(
        select::adults(reg, now, config.adult_age).filter(|p| {
            p.settlement.is_some()
                && p.traits.intelligence >= min
                && p.traits.charisma >= min
                && reg.open_enterprises_of(p.id).next().is_none()
        }),
        |p| u16::from(p.traits.intelligence) + u16::from(p.traits.charisma),
    )
}

/// Possibly open a new enterprise.
pub fn found(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    now: Tick,
) -> Option<EnterpriseId> {
    let owner = prospective_owner(reg, config, now)?;
    let person = reg.living_person(owner)?;
    let yield_multiplier = ArchetypeBonuses::of(person).trade_yield;
    if !ctx.rng.random_bool((config.enterprise_chance * yield_multiplier).clamp(0.0, 1.0)) {
        return None;
    }
    let settlement = person.settlement?;
    let owner_name = person.full_name();
    let trade = catalog
        .enterprise_trades
        .choose(&mut ctx.rng)
        .map_or(FALLBACK_TRADE, String::as_str);
    let name = format!("{}'s {trade}", person.surname);

    let id = reg.enterprises.insert_with_key(|id| Enterprise {
        id,
        name: name.clone(),
        owner,
        settlement,
        founded_at: now,
        wealth: config.enterprise_starting_wealth,
        reputation: 50,
        state: EnterpriseState::Growing,
        closed_at: None,
    });
    info!(tick = now, enterprise = %id, owner = %owner, "enterprise opened");
    ctx.record(
        now,
        EventCategory::Enterprise,
        format!("{owner_name} opened {name}"),
        vec![owner],
    );
    Some(id)
}

/// Evolve the open enterprises, then possibly open one more.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    now: Tick,
) -> EnterpriseReport {
    let closed = evolve(reg, ctx, config, now);
    let opened = found(reg, ctx, config, catalog, now);
    EnterpriseReport { opened, closed }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use progenitor_types::{Climate, Settlement, SettlementId, Sex, Terrain};

    use super::*;
    use crate::select::fixtures::{NOW, adult};

    fn town(reg: &mut Registries) -> SettlementId {
        reg.settlements.insert_with_key(|id| Settlement {
            id,
            name: String::from("Market"),
            terrain: Terrain::Coastal,
            climate: Climate::Temperate,
            founder: None,
            founded_at: 0,
            population: 0,
            wealth: Decimal::ZERO,
            polity: None,
        })
    }

    #[test]
    fn rates_map_to_states() {
        assert_eq!(next_state(0.2, 50), EnterpriseState::Growing);
        assert_eq!(next_state(0.05, 50), EnterpriseState::Stable);
        assert_eq!(next_state(-0.05, 50), EnterpriseState::Declining);
        assert_eq!(next_state(-0.2, 50), EnterpriseState::Failing);
        assert_eq!(next_state(0.2, 10), EnterpriseState::Declining);
    }

    #[test]
    fn owner_requires_settlement_and_traits() {
        let mut reg = Registries::default();
        let home = town(&mut reg);
        reg.insert_person(|_| adult(Sex::Male, 30, 90));
        let mut merchant = adult(Sex::Female, 30, 70);
        merchant.settlement = Some(home);
        let merchant = reg.insert_person(|_| merchant);
        let config = CivilizationConfig {
            enterprise_chance: 1.0,
            ..CivilizationConfig::default()
        };
        assert_eq!(prospective_owner(&reg, &config, NOW), Some(merchant));

        let mut ctx = SimContext::new(8, 100);
        let id = found(&mut reg, &mut ctx, &config, &ContentCatalog::empty(), NOW).unwrap();
        let enterprise = reg.enterprises.get(id).unwrap();
        assert_eq!(enterprise.name, "Citizen's Trading Post");
        assert_eq!(enterprise.wealth, dec!(100));
        assert_eq!(prospective_owner(&reg, &config, NOW), None);
    }

    #[test]
    fn insolvent_enterprise_closes() {
        let mut reg = Registries::default();
        let home = town(&mut reg);
        let owner = reg.insert_person(|_| adult(Sex::Male, 30, 70));
        let id = reg.enterprises.insert_with_key(|id| Enterprise {
            id,
            name: String::from("Doomed Mill"),
            owner,
            settlement: home,
            founded_at: 0,
            wealth: dec!(-45),
            reputation: 5,
            state: EnterpriseState::Failing,
            closed_at: None,
        });
        let mut ctx = SimContext::new(8, 100);
        let closed = evolve(&mut reg, &mut ctx, &CivilizationConfig::default(), NOW);
        assert_eq!(closed, vec![id]);
        let enterprise = reg.enterprises.get(id).unwrap();
        assert!(!enterprise.is_open());
        assert_eq!(enterprise.closed_at, Some(NOW));
    }
}
