//! Polity founding.
//!
//! The largest settlement without a polity, once it has enough residents,
//! becomes the capital of a new polity. Its most capable leader rules and
//! founds the ruling lineage; every resident joins.

use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

use progenitor_types::{EventCategory, Lineage, Polity, PolityId, SettlementId, Tick};
use progenitor_population::{ContentCatalog, Registries, SimContext, naming};

use crate::config::CivilizationConfig;
use crate::select;

/// The largest unclaimed settlement with at least the minimum population.
pub fn candidate_capital(reg: &Registries, config: &CivilizationConfig) -> Option<SettlementId> {
    let mut best: Option<(SettlementId, usize)> = None;
    for (id, settlement) in &reg.settlements {
        if settlement.polity.is_some() {
            continue;
        }
        let residents = reg.residents(id).count();
        if residents < config.polity_min_population {
            continue;
        }
        if best.is_none_or(|(_, top)| residents > top) {
            best = Some((id, residents));
        }
    }
    best.map(|(id, _)| id)
}

/// Possibly found a polity at `now`.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    now: Tick,
) -> Option<PolityId> {
    if !ctx.rng.random_bool(config.polity_chance.clamp(0.0, 1.0)) {
        return None;
    }
    let capital = candidate_capital(reg, config)?;
    let ruler = select::best_by(
        select::adult_residents(reg, capital, now, config.adult_age),
        |p| p.traits.leadership,
    )?;

    let name = naming::nth_or_numbered(&catalog.polity_names, reg.polities.len(), "Realm");
    let (ruler_name, house) = reg
        .person(ruler)
        .map(|p| (p.full_name(), format!("House {}", p.surname)))
        .unwrap_or_default();

    let id = reg.polities.insert_with_key(|id| Polity {
        id,
        name: name.clone(),
        capital,
        ruler: Some(ruler),
        lineage: None,
        founded_at: now,
        treasury: Decimal::ZERO,
    });
    let lineage = reg.lineages.insert_with_key(|lid| Lineage {
        id: lid,
        name: house,
        founder: ruler,
        head: Some(ruler),
        polity: Some(id),
        founded_at: now,
        prestige: 10,
    });
    if let Some(polity) = reg.polities.get_mut(id) {
        polity.lineage = Some(lineage);
    }
    if let Some(settlement) = reg.settlements.get_mut(capital) {
        settlement.polity = Some(id);
    }
    let residents: Vec<_> = reg.residents(capital).map(|p| p.id).collect();
    for resident in &residents {
        if let Some(p) = reg.person_mut(*resident) {
            p.polity = Some(id);
        }
    }

    info!(tick = now, polity = %id, ruler = %ruler, subjects = residents.len(), "polity founded");
    ctx.record(
        now,
        EventCategory::Polity,
        format!("{ruler_name} proclaimed {name}"),
        vec![ruler],
    );
    Some(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use progenitor_types::{Climate, Settlement, Sex, Terrain};

    use super::*;
    use crate::select::fixtures::{NOW, adult};

    fn settlement(reg: &mut Registries, residents: usize) -> SettlementId {
        let id = reg.settlements.insert_with_key(|id| Settlement {
            id,
            name: String::from("Town"),
            terrain: Terrain::River,
            climate: Climate::Temperate,
            founder: None,
            founded_at: 0,
            population: 0,
            wealth: Decimal::ZERO,
            polity: None,
        });
        for _ in 0..residents {
            let mut p = adult(Sex::Male, 30, 50);
            p.settlement = Some(id);
            reg.insert_person(|_| p);
        }
        id
    }

    fn always() -> CivilizationConfig {
        CivilizationConfig {
            polity_chance: 1.0,
            polity_min_population: 5,
            ..CivilizationConfig::default()
        }
    }

    #[test]
    fn largest_settlement_becomes_capital() {
        let mut reg = Registries::default();
        settlement(&mut reg, 5);
        let large = settlement(&mut reg, 8);
        settlement(&mut reg, 2);
        assert_eq!(candidate_capital(&reg, &always()), Some(large));
    }

    #[test]
    fn ruler_founds_lineage_and_residents_join() {
        let mut reg = Registries::default();
        let town = settlement(&mut reg, 6);
        let mut ruler = adult(Sex::Female, 45, 50);
        ruler.traits.leadership = 95;
        ruler.settlement = Some(town);
        ruler.surname = String::from("Vance");
        let ruler = reg.insert_person(|_| ruler);

        let mut ctx = SimContext::new(5, 100);
        let id = process(&mut reg, &mut ctx, &always(), &ContentCatalog::empty(), NOW).unwrap();
        let polity = reg.polities.get(id).unwrap();
        assert_eq!(polity.ruler, Some(ruler));
        assert_eq!(polity.capital, town);
        assert_eq!(polity.name, "Realm 1");
        let lineage = reg.lineages.get(polity.lineage.unwrap()).unwrap();
        assert_eq!(lineage.head, Some(ruler));
        assert_eq!(lineage.name, "House Vance");
        assert!(reg.residents(town).all(|p| p.polity == Some(id)));
        assert_eq!(reg.settlements.get(town).unwrap().polity, Some(id));

        // The capital is claimed; no second polity without another candidate.
        assert_eq!(process(&mut reg, &mut ctx, &always(), &ContentCatalog::empty(), NOW), None);
    }
}
