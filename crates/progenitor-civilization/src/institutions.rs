//! Schools, universities, and university research.
//!
//! A settlement with enough residents may open a school. Once the world
//! has enough schools, a wealthy and populous settlement may open a
//! university. Universities accumulate research every year, and a full
//! research budget lets the host settlement's best mind make a discovery.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::info;

use progenitor_types::{
    DiscoveryId, EventCategory, InstitutionId, InstitutionKind, LearningInstitution, SettlementId,
    Tick,
};
use progenitor_population::{ContentCatalog, OccupationIndex, Registries, SimContext};

use crate::config::CivilizationConfig;
use crate::discoveries;
use crate::select;

/// Summary of one year of institution activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionReport {
    /// Schools and universities opened.
    pub opened: Vec<InstitutionId>,
    /// Discoveries produced by university research.
    pub research_discoveries: Vec<DiscoveryId>,
}

/// Research a university produces in one year:
/// `quality / 10 * (1 + enrolled / 10)`.
pub fn yearly_research(institution: &LearningInstitution) -> u32 {
    let enrolled = u32::try_from(institution.enrolled.len()).unwrap_or(u32::MAX);
    let per_year = u32::from(institution.quality / 10);
    per_year.saturating_mul(enrolled.saturating_add(10)) / 10
}

fn open(
    reg: &mut Registries,
    ctx: &mut SimContext,
    settlement: SettlementId,
    kind: InstitutionKind,
    now: Tick,
) -> InstitutionId {
    let (quality, capacity, prestige, label) = match kind {
        InstitutionKind::School => (
            ctx.rng.random_range(40..=80),
            ctx.rng.random_range(30..=60),
            ctx.rng.random_range(30..=70),
            "School",
        ),
        InstitutionKind::University => (
            ctx.rng.random_range(50..=90),
            ctx.rng.random_range(20..=50),
            ctx.rng.random_range(50..=95),
            "University",
        ),
    };
    let town = reg
        .settlements
        .get(settlement)
        .map(|s| s.name.clone())
        .unwrap_or_default();
    let name = format!("{town} {label}");
    let id = reg.institutions.insert_with_key(|id| LearningInstitution {
        id,
        kind,
        name: name.clone(),
        settlement,
        founded_at: now,
        quality,
        capacity,
        prestige,
        enrolled: BTreeSet::new(),
        research_points: 0,
        graduates: 0,
    });
    info!(tick = now, institution = %id, ?kind, "institution opened");
    ctx.record(now, EventCategory::Institution, format!("{name} opened"), Vec::new());
    id
}

/// Accumulate research at every university and spend full budgets on
/// discoveries.
pub fn research(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    index: &mut OccupationIndex,
    now: Tick,
) -> Vec<DiscoveryId> {
    let universities: Vec<InstitutionId> = reg
        .institutions
        .iter()
        .filter(|(_, i)| i.kind == InstitutionKind::University)
        .map(|(id, _)| id)
        .collect();
    let threshold = config.research_threshold.max(1);
    let mut found = Vec::new();
    for id in universities {
        let Some(university) = reg.institutions.get_mut(id) else {
            continue;
        };
        university.research_points = university
            .research_points
            .saturating_add(yearly_research(university));
        if university.research_points < threshold {
            continue;
        }
        university.research_points -= threshold;
        let settlement = university.settlement;
        let mind = select::best_by(
            select::adult_residents(reg, settlement, now, config.adult_age),
            |p| u16::from(p.traits.intelligence) + u16::from(p.traits.creativity),
        );
        if let Some(mind) = mind {
            found.extend(discoveries::discover(reg, ctx, catalog, index, mind, now));
        }
    }
    found
}

/// Possibly open schools and universities.
pub fn found(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    now: Tick,
) -> Vec<InstitutionId> {
    let mut opened = Vec::new();
    let settlements: Vec<SettlementId> = reg.settlements.keys().collect();

    for &settlement in &settlements {
        if reg.institutions_in(settlement, InstitutionKind::School).next().is_some()
            || reg.residents(settlement).count() < config.school_min_population
        {
            continue;
        }
        if ctx.rng.random_bool(config.school_chance.clamp(0.0, 1.0)) {
            opened.push(open(reg, ctx, settlement, InstitutionKind::School, now));
        }
    }

    if reg.institution_count(InstitutionKind::School) < config.university_min_schools {
        return opened;
    }
    for &settlement in &settlements {
        let wealthy = reg
            .settlements
            .get(settlement)
            .is_some_and(|s| s.wealth >= config.university_min_wealth);
        if !wealthy
            || reg.institutions_in(settlement, InstitutionKind::University).next().is_some()
            || reg.residents(settlement).count() < config.university_min_population
        {
            continue;
        }
        if ctx.rng.random_bool(config.university_chance.clamp(0.0, 1.0)) {
            opened.push(open(reg, ctx, settlement, InstitutionKind::University, now));
        }
    }
    opened
}

/// Run research, then possibly open institutions.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    index: &mut OccupationIndex,
    now: Tick,
) -> InstitutionReport {
    let research_discoveries = research(reg, ctx, config, catalog, index, now);
    let opened = found(reg, ctx, config, now);
    InstitutionReport {
        opened,
        research_discoveries,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use progenitor_types::{Climate, PersonId, Settlement, Sex, Terrain};

    use super::*;
    use crate::select::fixtures::{NOW, adult};

    fn settlement(reg: &mut Registries, residents: usize, wealth: Decimal) -> SettlementId {
        let id = reg.settlements.insert_with_key(|id| Settlement {
            id,
            name: String::from("Athens"),
            terrain: Terrain::Coastal,
            climate: Climate::Temperate,
            founder: None,
            founded_at: 0,
            population: 0,
            wealth,
            polity: None,
        });
        for _ in 0..residents {
            let mut p = adult(Sex::Female, 30, 90);
            p.settlement = Some(id);
            reg.insert_person(|_| p);
        }
        id
    }

    fn always() -> CivilizationConfig {
        CivilizationConfig {
            school_chance: 1.0,
            university_chance: 1.0,
            ..CivilizationConfig::default()
        }
    }

    fn university(quality: u8) -> LearningInstitution {
        LearningInstitution {
            id: InstitutionId::default(),
            kind: InstitutionKind::University,
            name: String::from("U"),
            settlement: SettlementId::default(),
            founded_at: 0,
            quality,
            capacity: 100,
            prestige: 50,
            enrolled: BTreeSet::new(),
            research_points: 0,
            graduates: 0,
        }
    }

    #[test]
    fn research_rate() {
        assert_eq!(yearly_research(&university(80)), 8);
        assert_eq!(yearly_research(&university(95)), 9);

        let mut people: slotmap::SlotMap<PersonId, ()> = slotmap::SlotMap::with_key();
        let mut busy = university(80);
        busy.enrolled = (0..10).map(|_| people.insert(())).collect();
        assert_eq!(yearly_research(&busy), 16);
    }

    #[test]
    fn schools_open_in_populous_settlements() {
        let mut reg = Registries::default();
        let big = settlement(&mut reg, 30, Decimal::ZERO);
        settlement(&mut reg, 10, Decimal::ZERO);
        let mut ctx = SimContext::new(6, 100);
        let opened = found(&mut reg, &mut ctx, &always(), NOW);
        assert_eq!(opened.len(), 1);
        let school = reg.institutions.get(opened[0]).unwrap();
        assert_eq!(school.settlement, big);
        assert_eq!(school.name, "Athens School");
        assert!((40..=80).contains(&school.quality));
    }

    #[test]
    fn universities_need_schools_and_wealth() {
        let mut reg = Registries::default();
        settlement(&mut reg, 100, dec!(1000));
        let mut ctx = SimContext::new(6, 100);
        let opened = found(&mut reg, &mut ctx, &always(), NOW);
        // Only one school exists; a university needs two.
        assert_eq!(opened.len(), 1);

        settlement(&mut reg, 30, Decimal::ZERO);
        let opened = found(&mut reg, &mut ctx, &always(), NOW);
        assert_eq!(opened.len(), 2);
        let kinds: Vec<_> = opened
            .iter()
            .map(|id| reg.institutions.get(*id).unwrap().kind)
            .collect();
        assert_eq!(kinds, vec![InstitutionKind::School, InstitutionKind::University]);
    }

    #[test]
    fn full_research_budget_yields_discovery() {
        let catalog = ContentCatalog::builtin();
        let mut reg = Registries::default();
        let home = settlement(&mut reg, 3, dec!(1000));
        let mut ctx = SimContext::new(6, 100);
        let id = open(&mut reg, &mut ctx, home, InstitutionKind::University, NOW);
        reg.institutions.get_mut(id).unwrap().research_points = 99;
        let mut index = OccupationIndex::new();
        let found = research(&mut reg, &mut ctx, &always(), &catalog, &mut index, NOW);
        assert_eq!(found.len(), 1);
        assert!(reg.institutions.get(id).unwrap().research_points < 100);
    }
}
