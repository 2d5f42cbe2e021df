//! Daily conception.

use rand::Rng;
use tracing::debug;

use progenitor_types::{EventCategory, Individual, PersonId, Pregnancy, Sex, Tick};

use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::error::PopulationError;
use crate::registry::Registries;

/// Daily conception probability for a couple before the mother's
/// modifiers, keyed by living population.
pub const fn base_daily_probability(population: usize) -> f64 {
    match population {
        0..10 => 0.012,
        10..50 => 0.008,
        50..200 => 0.005,
        200..1000 => 0.003,
        1000..5000 => 0.0015,
        _ => 0.0008,
    }
}

/// Daily conception probability for `mother` in a population of
/// `population`.
pub fn conception_probability(mother: &Individual, population: usize) -> f64 {
    let mut p = base_daily_probability(population);
    p *= f64::from(mother.traits.fertility) / 100.0;
    p *= f64::from(mother.traits.health) / 100.0;
    if mother.genome.longevity > 70 {
        p *= 1.1;
    }
    if mother.generation <= 2 {
        p *= 1.2;
    }
    if mother.genome.disease_resistance < 30 {
        p *= 0.8;
    }
    p.clamp(0.0, 1.0)
}

/// Draw the number of children for a conception.
pub fn litter_size(config: &DemographyConfig, fertility: u8, rng: &mut impl Rng) -> u8 {
    let boost = if fertility > config.high_fertility_threshold {
        2.0
    } else {
        1.0
    };
    let roll: f64 = rng.random();
    let triplets = (config.triplet_chance * boost).clamp(0.0, 1.0);
    let twins = (config.twin_chance * boost).clamp(0.0, 1.0);
    if roll < triplets {
        3
    } else if roll < triplets + twins {
        2
    } else {
        1
    }
}

/// Whether `mother` may conceive at `now`. The husband must resolve and be
/// alive.
pub fn can_conceive(reg: &Registries, mother: &Individual, config: &DemographyConfig, now: Tick) -> bool {
    if !mother.alive || mother.sex != Sex::Female || mother.is_pregnant() {
        return false;
    }
    let age = mother.age_years(now);
    if age < config.fertile_min_age || age > config.fertile_max_age {
        return false;
    }
    if mother
        .last_birth_tick
        .is_some_and(|last| now - last < config.postpartum_days)
    {
        return false;
    }
    mother.spouse.is_some_and(|husband| reg.is_alive(husband))
}

fn conceive(reg: &mut Registries, mother: PersonId, father: PersonId, now: Tick, due: Tick, litter: u8) {
    if let Some(m) = reg.person_mut(mother) {
        m.pregnancy = Some(Pregnancy {
            conceived_at: now,
            due_tick: due,
            father: Some(father),
            litter_size: litter.clamp(1, 3),
        });
    }
}

/// Make `mother` pregnant by `father` regardless of chance, due after the
/// configured gestation.
pub fn impose(
    reg: &mut Registries,
    config: &DemographyConfig,
    mother: PersonId,
    father: PersonId,
    now: Tick,
    litter: u8,
) -> Result<(), PopulationError> {
    let m = reg
        .living_person(mother)
        .ok_or(PopulationError::PersonNotFound(mother))?;
    if m.sex != Sex::Female {
        return Err(PopulationError::NotEligible {
            person: mother,
            reason: String::from("not female"),
        });
    }
    if m.is_pregnant() {
        return Err(PopulationError::NotEligible {
            person: mother,
            reason: String::from("already pregnant"),
        });
    }
    reg.person(father)
        .ok_or(PopulationError::PersonNotFound(father))?;
    conceive(reg, mother, father, now, now + config.gestation_days, litter);
    Ok(())
}

/// Run one day of conception. Returns the mothers who conceived.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    now: Tick,
) -> Vec<PersonId> {
    let population = reg.living_count();
    let candidates: Vec<(PersonId, PersonId, f64, u8)> = reg
        .living_of_sex(Sex::Female)
        .filter(|m| can_conceive(reg, m, config, now))
        .filter_map(|m| {
            m.spouse
                .map(|h| (m.id, h, conception_probability(m, population), m.traits.fertility))
        })
        .collect();

    let mut conceived = Vec::new();
    for (mother, father, chance, fertility) in candidates {
        if !ctx.rng.random_bool(chance) {
            continue;
        }
        let litter = litter_size(config, fertility, &mut ctx.rng);
        conceive(reg, mother, father, now, now + config.gestation_days, litter);
        debug!(tick = now, mother = %mother, litter, "conceived");
        let name = reg.person(mother).map(Individual::full_name).unwrap_or_default();
        ctx.record(
            now,
            EventCategory::Pregnancy,
            format!("{name} is expecting"),
            vec![mother, father],
        );
        conceived.push(mother);
    }
    conceived
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::registry::fixtures::{born_years_ago, person};

    const NOW: Tick = 100 * 365;

    fn couple(reg: &mut Registries, wife_age: i64) -> (PersonId, PersonId) {
        let husband = reg.insert_person(|_| person(Sex::Male, born_years_ago(NOW, 30)));
        let wife = reg.insert_person(|_| person(Sex::Female, born_years_ago(NOW, wife_age)));
        reg.person_mut(husband).unwrap().spouse = Some(wife);
        reg.person_mut(wife).unwrap().spouse = Some(husband);
        (husband, wife)
    }

    #[test]
    fn base_probability_bands() {
        assert!((base_daily_probability(2) - 0.012).abs() < f64::EPSILON);
        assert!((base_daily_probability(10) - 0.008).abs() < f64::EPSILON);
        assert!((base_daily_probability(999) - 0.003).abs() < f64::EPSILON);
        assert!((base_daily_probability(10_000) - 0.0008).abs() < f64::EPSILON);
    }

    #[test]
    fn modifiers_scale_probability() {
        let mut mother = person(Sex::Female, 0);
        mother.traits.fertility = 100;
        mother.traits.health = 100;
        mother.genome.longevity = 80;
        mother.generation = 1;
        let expected = 0.012 * 1.1 * 1.2;
        assert!((conception_probability(&mother, 2) - expected).abs() < 1e-12);

        mother.genome.disease_resistance = 10;
        assert!((conception_probability(&mother, 2) - expected * 0.8).abs() < 1e-12);
    }

    #[test]
    fn eligibility_rules() {
        let config = DemographyConfig::default();
        let mut reg = Registries::default();
        let (husband, wife) = couple(&mut reg, 25);
        assert!(can_conceive(&reg, reg.person(wife).unwrap(), &config, NOW));

        reg.person_mut(wife).unwrap().last_birth_tick = Some(NOW - 30);
        assert!(!can_conceive(&reg, reg.person(wife).unwrap(), &config, NOW));
        reg.person_mut(wife).unwrap().last_birth_tick = Some(NOW - 100);
        assert!(can_conceive(&reg, reg.person(wife).unwrap(), &config, NOW));

        reg.kill(husband, NOW, progenitor_types::CauseOfDeath::Fever);
        assert!(!can_conceive(&reg, reg.person(wife).unwrap(), &config, NOW));

        let (_, older) = couple(&mut reg, 46);
        assert!(!can_conceive(&reg, reg.person(older).unwrap(), &config, NOW));
    }

    #[test]
    fn litter_sizes_follow_rates() {
        let config = DemographyConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let n = 100_000;
        let twins = (0..n)
            .filter(|_| litter_size(&config, 50, &mut rng) == 2)
            .count();
        let rate = twins as f64 / f64::from(n);
        assert!((0.015..0.025).contains(&rate), "twin rate {rate}");

        let boosted = (0..n)
            .filter(|_| litter_size(&config, 90, &mut rng) == 2)
            .count();
        let rate = boosted as f64 / f64::from(n);
        assert!((0.033..0.047).contains(&rate), "boosted twin rate {rate}");
    }

    #[test]
    fn impose_sets_due_date() {
        let config = DemographyConfig::default();
        let mut reg = Registries::default();
        let (husband, wife) = couple(&mut reg, 25);
        impose(&mut reg, &config, wife, husband, NOW, 2).unwrap();
        let pregnancy = reg.person(wife).unwrap().pregnancy.clone().unwrap();
        assert_eq!(pregnancy.due_tick, NOW + 270);
        assert_eq!(pregnancy.father, Some(husband));
        assert_eq!(pregnancy.litter_size, 2);
        assert!(impose(&mut reg, &config, wife, husband, NOW, 1).is_err());
        assert!(impose(&mut reg, &config, husband, wife, NOW, 1).is_err());
    }

    #[test]
    fn married_couple_eventually_conceives() {
        let config = DemographyConfig::default();
        let mut reg = Registries::default();
        let (_, wife) = couple(&mut reg, 22);
        reg.person_mut(wife).unwrap().traits.fertility = 100;
        reg.person_mut(wife).unwrap().traits.health = 100;
        let mut ctx = SimContext::new(5, 100);
        let day = (0..2000).find(|d| !process(&mut reg, &mut ctx, &config, NOW + d).is_empty());
        assert!(day.is_some());
        assert!(reg.person(wife).unwrap().is_pregnant());
    }
}
