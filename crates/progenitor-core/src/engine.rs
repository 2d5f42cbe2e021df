//! The simulation engine.
//!
//! [`SimulationEngine`] owns every registry, the random stream, the clock,
//! and the occupation index. One call to [`SimulationEngine::tick`] runs
//! one day:
//!
//! 1. The daily demographic routines (death, education, occupation,
//!    marriage, pregnancy, birth)
//! 2. On the last day of a year, the yearly civilization events
//! 3. The clock advances
//!
//! Everything else is a read-only projection ([`SimulationEngine::statistics`])
//! or a whole-state replacement ([`SimulationEngine::restart`],
//! [`SimulationEngine::restore`]).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use progenitor_civilization::{YearReport, run_year};
use progenitor_population::{
    ContentCatalog, EventLog, OccupationIndex, Registries, SimContext, genetics, naming,
    notability, run_day,
};
use progenitor_types::{
    DAYS_PER_YEAR, EducationStage, EventCategory, Individual, Lineage, PersonId, RunId, Sex, Tick,
    Traits,
};

use crate::clock::{self, ClockError, WorldClock};
use crate::config::SimulationConfig;
use crate::persistence::PersistError;
use crate::stats::{SimulationEndReason, StatisticsSnapshot};

/// Snapshot format this build writes and reads.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Errors from running the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The day that ran.
    pub tick: Tick,
    /// Living population after the day.
    pub living: usize,
    /// Deaths during the day.
    pub deaths: usize,
    /// Births during the day.
    pub births: usize,
    /// Marriages during the day.
    pub marriages: usize,
    /// Conceptions during the day.
    pub conceptions: usize,
    /// The yearly events, when the day closed a year.
    pub year: Option<YearReport>,
}

/// Full serializable state of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Format version; see [`SNAPSHOT_FORMAT_VERSION`].
    pub format_version: u32,
    /// Run the snapshot belongs to.
    pub run_id: RunId,
    /// Seed the run was started with.
    pub seed: u64,
    /// The next tick to run.
    pub tick: Tick,
    /// Wall-clock time of the save.
    pub saved_at: DateTime<Utc>,
    /// Every entity.
    pub registries: Registries,
    /// Recent domain events.
    pub events: EventLog,
    /// Who is waiting for an occupation.
    pub occupation_index: OccupationIndex,
}

/// Check that a decoded snapshot can safely replace the running state.
pub fn validate(snapshot: &EngineSnapshot) -> Result<(), PersistError> {
    if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(PersistError::IncompatibleVersion {
            found: snapshot.format_version,
            expected: SNAPSHOT_FORMAT_VERSION,
        });
    }
    let reg = &snapshot.registries;
    let corrupt = |reason: String| Err(PersistError::Corrupt { reason });
    if let Some(id) = reg
        .living
        .iter()
        .find(|id| reg.people.get(**id).is_none_or(|p| !p.alive))
    {
        return corrupt(format!("living index holds {id}, who is not a living individual"));
    }
    if let Some(id) = reg
        .dead
        .iter()
        .find(|id| reg.people.get(**id).is_none_or(|p| p.alive))
    {
        return corrupt(format!("dead index holds {id}, who is not a dead individual"));
    }
    if reg.living.len() + reg.dead.len() != reg.people.len() {
        return corrupt(String::from("living and dead indexes do not cover every individual"));
    }
    if let Some((m, f)) = reg.founders {
        if !reg.people.contains_key(m) || !reg.people.contains_key(f) {
            return corrupt(String::from("founders do not resolve"));
        }
    }
    Ok(())
}

/// Owner of all simulation state.
#[derive(Debug)]
pub struct SimulationEngine {
    config: SimulationConfig,
    catalog: ContentCatalog,
    run_id: RunId,
    seed: u64,
    clock: WorldClock,
    registries: Registries,
    context: SimContext,
    index: OccupationIndex,
}

impl SimulationEngine {
    /// A new run seeded from the configuration, starting from the
    /// founding pair.
    pub fn new(config: SimulationConfig, catalog: ContentCatalog) -> Self {
        let seed = config.world.seed;
        Self::seeded(config, catalog, seed)
    }

    fn seeded(config: SimulationConfig, catalog: ContentCatalog, seed: u64) -> Self {
        let mut context = SimContext::new(seed, config.world.event_capacity);
        let mut registries = Registries::new(catalog.occupations.clone());
        let (adam, eve) = seed_founders(&mut registries, &mut context, &config, &catalog);
        let index = OccupationIndex::rebuild(&registries, &config.demography, 0);
        let run_id = RunId::new();
        info!(
            run = %run_id,
            world = config.world.name,
            seed,
            founders = %format!("{adam}, {eve}"),
            "simulation seeded"
        );
        Self {
            config,
            catalog,
            run_id,
            seed,
            clock: WorldClock::new(),
            registries,
            context,
            index,
        }
    }

    /// Run one day.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] if the clock cannot advance.
    pub fn tick(&mut self) -> Result<TickSummary, EngineError> {
        let now = self.clock.tick();
        let daily = run_day(
            &mut self.registries,
            &mut self.context,
            &self.config.demography,
            &self.catalog,
            &mut self.index,
            now,
        );
        let year = clock::is_year_end(now).then(|| {
            run_year(
                &mut self.registries,
                &mut self.context,
                &self.config.civilization,
                &self.config.demography,
                &self.catalog,
                &mut self.index,
                now,
            )
        });
        if year.is_some() {
            debug!(
                tick = now,
                living = self.registries.living_count(),
                job_seekers = self.index.pending_len(),
                unplaced = self.index.idle_len(),
                "year closed"
            );
        }
        self.clock.advance()?;
        Ok(TickSummary {
            tick: now,
            living: self.registries.living_count(),
            deaths: daily.deaths.len(),
            births: daily.births.len(),
            marriages: daily.marriages.len(),
            conceptions: daily.conceptions.len(),
            year,
        })
    }

    /// Run `days` ticks. Returns the last summary, if any day ran.
    ///
    /// # Errors
    ///
    /// Returns the first tick error; the days before it stay applied.
    pub fn advance(&mut self, days: u64) -> Result<Option<TickSummary>, EngineError> {
        let mut last = None;
        for _ in 0..days {
            last = Some(self.tick()?);
        }
        Ok(last)
    }

    /// Why the simulation has ended, if it has: nobody is alive, or no
    /// man or no woman at or below the fertile upper age remains.
    pub fn ended(&self) -> Option<SimulationEndReason> {
        let reg = &self.registries;
        if reg.living_count() == 0 {
            return Some(SimulationEndReason::Extinction);
        }
        let now = self.clock.tick();
        let max_age = self.config.demography.fertile_max_age;
        let has_young = |sex: Sex| reg.living_of_sex(sex).any(|p| p.age_years(now) <= max_age);
        if !has_young(Sex::Male) {
            return Some(SimulationEndReason::NoFertileMales);
        }
        if !has_young(Sex::Female) {
            return Some(SimulationEndReason::NoFertileFemales);
        }
        None
    }

    /// Read-only projection of the current state.
    pub fn statistics(&self) -> StatisticsSnapshot {
        StatisticsSnapshot::collect(
            self.run_id,
            &self.clock,
            &self.registries,
            &self.context.events,
            self.config.demography.min_working_age,
            self.ended(),
        )
    }

    /// Discard all state and start a new run from a fresh founding pair.
    pub fn restart(&mut self, seed: u64) {
        let previous = self.run_id;
        let config = std::mem::take(&mut self.config);
        let catalog = std::mem::take(&mut self.catalog);
        *self = Self::seeded(config, catalog, seed);
        self.context.record(
            0,
            EventCategory::Simulation,
            format!("The world was begun anew with seed {seed}"),
            Vec::new(),
        );
        info!(previous = %previous, run = %self.run_id, seed, "simulation restarted");
    }

    /// Capture the full state.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            run_id: self.run_id,
            seed: self.seed,
            tick: self.clock.tick(),
            saved_at: Utc::now(),
            registries: self.registries.clone(),
            events: self.context.events.clone(),
            occupation_index: self.index.clone(),
        }
    }

    /// Replace the running state with a snapshot. On error the current
    /// state is left untouched.
    ///
    /// The random stream is reseeded from the snapshot's seed and tick.
    pub fn restore(&mut self, snapshot: EngineSnapshot) -> Result<(), PersistError> {
        validate(&snapshot)?;
        let clock = WorldClock::at(snapshot.tick).map_err(|e| PersistError::Corrupt {
            reason: e.to_string(),
        })?;
        self.run_id = snapshot.run_id;
        self.seed = snapshot.seed;
        self.clock = clock;
        self.registries = snapshot.registries;
        self.context = SimContext::resume(snapshot.seed, snapshot.tick, snapshot.events);
        self.index = snapshot.occupation_index;
        info!(
            run = %self.run_id,
            tick = self.clock.tick(),
            living = self.registries.living_count(),
            "simulation restored"
        );
        Ok(())
    }

    /// Serialize the full state as JSON.
    pub fn save_json(&self) -> Result<Vec<u8>, PersistError> {
        Ok(serde_json::to_vec(&self.snapshot())?)
    }

    /// Replace the running state with a JSON save. On error the current
    /// state is left untouched.
    pub fn load_json(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        let snapshot: EngineSnapshot = serde_json::from_slice(bytes)?;
        self.restore(snapshot)
    }

    /// [`load_json`](Self::load_json), reporting only success.
    pub fn try_load_json(&mut self, bytes: &[u8]) -> bool {
        match self.load_json(bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "save rejected");
                false
            }
        }
    }

    /// The next tick to run.
    pub const fn tick_count(&self) -> Tick {
        self.clock.tick()
    }

    /// Identifier of the current run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Seed of the current run.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Every entity.
    pub const fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Every entity, mutably, for scenario setup between ticks.
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    /// Recent domain events.
    pub const fn events(&self) -> &EventLog {
        &self.context.events
    }
}

// ---------------------------------------------------------------------------
// Founders
// ---------------------------------------------------------------------------

fn founder(
    ctx: &mut SimContext,
    catalog: &ContentCatalog,
    sex: Sex,
    surname: String,
    birth_tick: Tick,
) -> Individual {
    let traits = Traits::uniform(100);
    let notable = notability::evaluate(&traits);
    Individual {
        id: PersonId::default(),
        given_name: naming::given_name(catalog, sex, &mut ctx.rng),
        surname,
        sex,
        birth_tick,
        death_tick: None,
        cause_of_death: None,
        alive: true,
        father: None,
        mother: None,
        spouse: None,
        married_at: None,
        former_spouses: Vec::new(),
        children: Vec::new(),
        traits,
        physique: genetics::founder_physique(sex, traits.strength, &mut ctx.rng),
        genome: genetics::founder_genome(&mut ctx.rng),
        generation: 0,
        settlement: None,
        polity: None,
        belief: None,
        occupation: None,
        occupation_since: None,
        education: EducationStage::None,
        literate: false,
        institution: None,
        pregnancy: None,
        last_birth_tick: None,
        notable: notable.is_some(),
        archetype: notable.as_ref().map(|n| n.archetype),
        notability_reason: notable.map(|n| n.reason),
        social_status: 0,
        wealth: Decimal::ZERO,
    }
}

/// Insert the founding pair, married to each other, and their lineage.
fn seed_founders(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &SimulationConfig,
    catalog: &ContentCatalog,
) -> (PersonId, PersonId) {
    let birth_tick = -(i64::from(config.founders.age) * DAYS_PER_YEAR);
    let male_surname = config
        .founders
        .male_surname
        .clone()
        .unwrap_or_else(|| naming::surname(catalog, &mut ctx.rng));
    let female_surname = config
        .founders
        .female_surname
        .clone()
        .unwrap_or_else(|| naming::surname(catalog, &mut ctx.rng));

    let man = founder(ctx, catalog, Sex::Male, male_surname.clone(), birth_tick);
    let woman = founder(ctx, catalog, Sex::Female, female_surname, birth_tick);
    let adam = reg.insert_person(|_| man);
    let eve = reg.insert_person(|_| woman);
    for (me, partner) in [(adam, eve), (eve, adam)] {
        if let Some(p) = reg.person_mut(me) {
            p.spouse = Some(partner);
            p.married_at = Some(0);
        }
    }
    reg.founders = Some((adam, eve));

    let house = format!("House {male_surname}");
    reg.lineages.insert_with_key(|id| Lineage {
        id,
        name: house.clone(),
        founder: adam,
        head: Some(adam),
        polity: None,
        founded_at: 0,
        prestige: 0,
    });

    let name = |id: PersonId| reg.person(id).map(Individual::full_name).unwrap_or_default();
    let couple = format!("{} and {}", name(adam), name(eve));
    debug!(%couple, %house, "founders seeded");
    ctx.record(
        0,
        EventCategory::Simulation,
        format!("{couple} founded {house}"),
        vec![adam, eve],
    );
    (adam, eve)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn engine() -> SimulationEngine {
        SimulationEngine::new(SimulationConfig::default(), ContentCatalog::builtin())
    }

    #[test]
    fn founders_are_a_married_adult_pair() {
        let engine = engine();
        let reg = engine.registries();
        let (adam, eve) = reg.founders.unwrap();
        let (m, f) = (reg.person(adam).unwrap(), reg.person(eve).unwrap());
        assert_eq!(m.sex, Sex::Male);
        assert_eq!(f.sex, Sex::Female);
        assert_eq!(m.spouse, Some(eve));
        assert_eq!(f.spouse, Some(adam));
        assert_eq!(m.age_years(0), 20);
        assert_eq!(m.traits, Traits::uniform(100));
        assert_eq!(m.genome.sequence.len(), genetics::SEQUENCE_LENGTH);
        assert_eq!(reg.lineages.len(), 1);
        assert_eq!(engine.ended(), None);
    }

    #[test]
    fn configured_surnames_are_used() {
        let mut config = SimulationConfig::default();
        config.founders.male_surname = Some(String::from("Stone"));
        config.founders.female_surname = Some(String::from("Reed"));
        let engine = SimulationEngine::new(config, ContentCatalog::empty());
        let reg = engine.registries();
        let (adam, eve) = reg.founders.unwrap();
        assert_eq!(reg.person(adam).unwrap().surname, "Stone");
        assert_eq!(reg.person(eve).unwrap().surname, "Reed");
        assert_eq!(reg.lineages.values().next().unwrap().name, "House Stone");
    }

    #[test]
    fn tick_advances_clock() {
        let mut engine = engine();
        let summary = engine.tick().unwrap();
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.year, None);
        assert_eq!(engine.tick_count(), 1);
    }

    #[test]
    fn yearly_events_run_on_last_day() {
        let mut engine = engine();
        let last = engine.advance(365).unwrap().unwrap();
        assert_eq!(last.tick, 364);
        assert!(last.year.is_some());
    }

    #[test]
    fn restart_reseeds() {
        let mut engine = engine();
        engine.advance(40).unwrap();
        let before = engine.run_id();
        engine.restart(99);
        assert_ne!(engine.run_id(), before);
        assert_eq!(engine.seed(), 99);
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.registries().people.len(), 2);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut engine = engine();
        let mut snapshot = engine.snapshot();
        snapshot.format_version = 99;
        let err = engine.restore(snapshot).unwrap_err();
        assert!(matches!(err, PersistError::IncompatibleVersion { found: 99, .. }));
    }

    #[test]
    fn inconsistent_partition_is_rejected() {
        let mut engine = engine();
        let mut snapshot = engine.snapshot();
        let (adam, _) = snapshot.registries.founders.unwrap();
        snapshot.registries.living.remove(&adam);
        assert!(matches!(
            engine.restore(snapshot),
            Err(PersistError::Corrupt { .. })
        ));
        assert!(engine.registries().is_alive(adam));
    }
}
