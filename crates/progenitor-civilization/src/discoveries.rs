//! Discoveries and their effects on the population.
//!
//! A discovery raises the health of every living individual, removes
//! years from everyone's effective age, and may unlock occupations, so
//! the occupation index re-queues everyone who previously matched nothing.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::info;

use progenitor_types::{Discovery, DiscoveryDefinition, DiscoveryId, EventCategory, PersonId, Tick};
use progenitor_population::{ArchetypeBonuses, ContentCatalog, OccupationIndex, Registries, SimContext};

use crate::config::CivilizationConfig;
use crate::select;

/// Highest discovery-speed multiplier among the living.
pub fn best_discovery_speed(reg: &Registries) -> f64 {
    reg.living_people()
        .map(|p| ArchetypeBonuses::of(p).discovery_speed)
        .fold(1.0, f64::max)
}

/// The adult with the highest combined intelligence and creativity.
pub fn inventor(reg: &Registries, config: &CivilizationConfig, now: Tick) -> Option<PersonId> {
    select::best_by(select::adults(reg, now, config.adult_age), |p| {
        u16::from(p.traits.intelligence) + u16::from(p.traits.creativity)
    })
}

/// Undiscovered catalog entries `intelligence` is enough for.
pub fn within_reach<'a>(
    reg: &Registries,
    catalog: &'a ContentCatalog,
    intelligence: u8,
) -> Vec<&'a DiscoveryDefinition> {
    catalog
        .discoveries
        .iter()
        .filter(|d| d.required_intelligence <= intelligence && !reg.is_discovered(&d.name))
        .collect()
}

/// Let `inventor` make a discovery chosen uniformly among those within
/// reach. Returns `None` when nothing is left for them to find.
pub fn discover(
    reg: &mut Registries,
    ctx: &mut SimContext,
    catalog: &ContentCatalog,
    index: &mut OccupationIndex,
    inventor: PersonId,
    now: Tick,
) -> Option<DiscoveryId> {
    let person = reg.living_person(inventor)?;
    let inventor_name = person.full_name();
    let definition = within_reach(reg, catalog, person.traits.intelligence)
        .choose(&mut ctx.rng)
        .copied()?
        .clone();

    let id = reg.discoveries.insert_with_key(|id| Discovery {
        id,
        name: definition.name.clone(),
        category: definition.category,
        inventor,
        discovered_at: now,
        health_bonus: definition.health_bonus,
        lifespan_bonus: definition.lifespan_bonus,
        description: definition.description.clone(),
    });
    if definition.health_bonus > 0 {
        for living in reg.living_ids() {
            if let Some(p) = reg.person_mut(living) {
                p.traits.health = p.traits.health.saturating_add(definition.health_bonus).min(100);
            }
        }
    }
    reg.lifespan_bonus_years = reg
        .lifespan_bonus_years
        .saturating_add(u32::from(definition.lifespan_bonus));
    if let Some(p) = reg.person_mut(inventor) {
        p.social_status = p.social_status.saturating_add(5);
    }
    index.requeue_idle();

    info!(tick = now, discovery = %definition.name, inventor = %inventor, "discovery made");
    ctx.record(
        now,
        EventCategory::Discovery,
        format!("{inventor_name} discovered {}", definition.name),
        vec![inventor],
    );
    Some(id)
}

/// Possibly make the year's discovery.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    catalog: &ContentCatalog,
    index: &mut OccupationIndex,
    now: Tick,
) -> Option<DiscoveryId> {
    let chance = (config.discovery_chance * best_discovery_speed(reg)).clamp(0.0, 1.0);
    if !ctx.rng.random_bool(chance) {
        return None;
    }
    let who = inventor(reg, config, now)?;
    discover(reg, ctx, catalog, index, who, now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use progenitor_types::{Archetype, Sex};

    use super::*;
    use crate::select::fixtures::{NOW, adult};

    fn always() -> CivilizationConfig {
        CivilizationConfig {
            discovery_chance: 1.0,
            ..CivilizationConfig::default()
        }
    }

    #[test]
    fn scientists_speed_discovery() {
        let mut reg = Registries::default();
        reg.insert_person(|_| adult(Sex::Male, 30, 50));
        assert!((best_discovery_speed(&reg) - 1.0).abs() < f64::EPSILON);
        let mut genius = adult(Sex::Female, 30, 95);
        genius.archetype = Some(Archetype::Scientific);
        reg.insert_person(|_| genius);
        assert!((best_discovery_speed(&reg) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn discovery_applies_bonuses() {
        let catalog = ContentCatalog::builtin();
        let mut reg = Registries::new(catalog.occupations.clone());
        let sage = reg.insert_person(|_| adult(Sex::Male, 40, 100));
        let other = reg.insert_person(|_| adult(Sex::Female, 30, 50));
        let mut ctx = SimContext::new(4, 100);
        let mut index = OccupationIndex::new();

        let id = process(&mut reg, &mut ctx, &always(), &catalog, &mut index, NOW).unwrap();
        let discovery = reg.discoveries.get(id).unwrap().clone();
        assert_eq!(discovery.inventor, sage);
        assert!(reg.is_discovered(&discovery.name));
        assert_eq!(reg.lifespan_bonus_years, u32::from(discovery.lifespan_bonus));
        assert_eq!(
            reg.person(other).unwrap().traits.health,
            50 + discovery.health_bonus
        );
    }

    #[test]
    fn catalog_runs_dry() {
        let catalog = ContentCatalog::builtin();
        let mut reg = Registries::default();
        let sage = reg.insert_person(|_| adult(Sex::Male, 40, 100));
        let mut ctx = SimContext::new(4, 100);
        let mut index = OccupationIndex::new();
        for _ in 0..catalog.discoveries.len() {
            assert!(discover(&mut reg, &mut ctx, &catalog, &mut index, sage, NOW).is_some());
        }
        assert!(discover(&mut reg, &mut ctx, &catalog, &mut index, sage, NOW).is_none());
        assert_eq!(reg.discoveries.len(), catalog.discoveries.len());
    }

    #[test]
    fn empty_catalog_discovers_nothing() {
        let mut reg = Registries::default();
        reg.insert_person(|_| adult(Sex::Male, 40, 100));
        let mut ctx = SimContext::new(4, 100);
        let mut index = OccupationIndex::new();
        let found = process(&mut reg, &mut ctx, &always(), &ContentCatalog::empty(), &mut index, NOW);
        assert_eq!(found, None);
    }
}
