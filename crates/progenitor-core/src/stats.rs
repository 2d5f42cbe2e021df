//! Read-only statistics projection for observers.
//!
//! [`StatisticsSnapshot::collect`] reads the registries and never writes
//! to them, so two calls between ticks return equal snapshots.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use progenitor_population::genealogy::descendants;
use progenitor_population::{DepthMemo, EventLog, GenealogyTree, Registries, build_tree};
use progenitor_types::{
    CalamityKind, DomainEvent, EnterpriseState, InstitutionKind, PersonId, RunId, Sex, Tick,
};

use crate::clock::WorldClock;

/// Events included in a snapshot's tail.
pub const EVENT_TAIL: usize = 50;

/// Deepest generation included in the genealogy tree.
pub const GENEALOGY_MAX_DEPTH: u32 = 12;

/// Most individuals included in the genealogy tree.
pub const GENEALOGY_MAX_NODES: usize = 500;

/// Occupation label for living adults without work.
pub const UNEMPLOYED: &str = "Unemployed";

/// Why a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Nobody is alive.
    Extinction,
    /// No living man is at or below the fertile upper age.
    NoFertileMales,
    /// No living woman is at or below the fertile upper age.
    NoFertileFemales,
    /// An operator issued a stop command.
    OperatorStop,
    /// The configured tick limit was reached.
    MaxTicksReached,
}

impl SimulationEndReason {
    /// Whether the population itself ended the run, as opposed to a
    /// limit or an operator.
    pub const fn is_demographic(self) -> bool {
        matches!(
            self,
            Self::Extinction | Self::NoFertileMales | Self::NoFertileFemales
        )
    }
}

/// A settlement as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Name.
    pub name: String,
    /// Residents at the last recount.
    pub population: u32,
    /// Accumulated wealth.
    pub wealth: Decimal,
    /// Polity name, if any.
    pub polity: Option<String>,
}

/// A polity as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolitySummary {
    /// Name.
    pub name: String,
    /// Capital settlement name.
    pub capital: String,
    /// Ruler's full name, if the ruler is still alive.
    pub ruler: Option<String>,
    /// Founding tick.
    pub founded_at: Tick,
}

/// A discovery as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySummary {
    /// Catalog name.
    pub name: String,
    /// Inventor's full name.
    pub inventor: String,
    /// Tick of discovery.
    pub discovered_at: Tick,
}

/// A calamity as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalamitySummary {
    /// Kind.
    pub kind: CalamityKind,
    /// Settlement name.
    pub settlement: String,
    /// Tick it struck.
    pub tick: Tick,
    /// Severity, `1..=10`.
    pub severity: u8,
    /// Deaths caused.
    pub casualties: u32,
}

/// An enterprise as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseSummary {
    /// Name.
    pub name: String,
    /// Owner's full name.
    pub owner: String,
    /// Lifecycle state.
    pub state: EnterpriseState,
    /// Net worth.
    pub wealth: Decimal,
}

/// A school or university as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionSummary {
    /// Name.
    pub name: String,
    /// Host settlement name.
    pub settlement: String,
    /// Students enrolled.
    pub enrolled: usize,
    /// Graduates so far.
    pub graduates: u32,
}

/// Everything an observer can see between two ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Identifier of the current run.
    pub run_id: RunId,
    /// Current tick.
    pub tick: Tick,
    /// Current year.
    pub year: Tick,
    /// Living individuals.
    pub living: usize,
    /// Dead individuals.
    pub dead: usize,
    /// Living men.
    pub males: usize,
    /// Living women.
    pub females: usize,
    /// Highest generation ever born.
    pub max_generation: u32,
    /// Longest chain of known ancestors above any living individual.
    pub max_lineage_depth: u32,
    /// Living descendants of the founding pair.
    pub founder_descendants: usize,
    /// Most recent domain events, oldest first.
    pub recent_events: Vec<DomainEvent>,
    /// Living adults per occupation name, plus [`UNEMPLOYED`].
    pub occupations: BTreeMap<String, usize>,
    /// Settlements.
    pub settlements: Vec<SettlementSummary>,
    /// Polities.
    pub polities: Vec<PolitySummary>,
    /// Discoveries in order.
    pub discoveries: Vec<DiscoverySummary>,
    /// Calamities in order.
    pub calamities: Vec<CalamitySummary>,
    /// Enterprises, open and closed.
    pub enterprises: Vec<EnterpriseSummary>,
    /// Schools.
    pub schools: Vec<InstitutionSummary>,
    /// Universities.
    pub universities: Vec<InstitutionSummary>,
    /// Descendants of the founding pair.
    pub genealogy: GenealogyTree,
    /// Whether the simulation has ended.
    pub ended: bool,
    /// Why it ended.
    pub end_reason: Option<SimulationEndReason>,
}

fn name_of(reg: &Registries, id: PersonId) -> String {
    reg.person(id)
        .map_or_else(|| String::from("Unknown"), progenitor_types::Individual::full_name)
}

fn settlement_name(reg: &Registries, id: progenitor_types::SettlementId) -> String {
    reg.settlements
        .get(id)
        .map_or_else(|| String::from("Unknown"), |s| s.name.clone())
}

fn institutions(reg: &Registries, kind: InstitutionKind) -> Vec<InstitutionSummary> {
    reg.institutions
        .values()
        .filter(|i| i.kind == kind)
        .map(|i| InstitutionSummary {
            name: i.name.clone(),
            settlement: settlement_name(reg, i.settlement),
            enrolled: i.enrolled.len(),
            graduates: i.graduates,
        })
        .collect()
}

impl StatisticsSnapshot {
    /// Project the registries into a snapshot.
    pub fn collect(
        run_id: RunId,
        clock: &WorldClock,
        reg: &Registries,
        events: &EventLog,
        min_working_age: u32,
        end_reason: Option<SimulationEndReason>,
    ) -> Self {
        let now = clock.tick();
        let males = reg.living_of_sex(Sex::Male).count();
        let females = reg.living_of_sex(Sex::Female).count();

        let mut occupations: BTreeMap<String, usize> = BTreeMap::new();
        for person in reg.living_people().filter(|p| p.age_years(now) >= min_working_age) {
            let label = person
                .occupation
                .and_then(|o| reg.occupation(o))
                .map_or(UNEMPLOYED, |o| o.name.as_str());
            *occupations.entry(label.to_owned()).or_default() += 1;
        }

        let settlements = reg
            .settlements
            .values()
            .map(|s| SettlementSummary {
                name: s.name.clone(),
                population: s.population,
                wealth: s.wealth,
                polity: s
                    .polity
                    .and_then(|p| reg.polities.get(p))
                    .map(|p| p.name.clone()),
            })
            .collect();
        let polities = reg
            .polities
            .values()
            .map(|p| PolitySummary {
                name: p.name.clone(),
                capital: settlement_name(reg, p.capital),
                ruler: p.ruler.and_then(|r| reg.living_person(r)).map(|r| r.full_name()),
                founded_at: p.founded_at,
            })
            .collect();
        let discoveries = reg
            .discoveries
            .values()
            .map(|d| DiscoverySummary {
                name: d.name.clone(),
                inventor: name_of(reg, d.inventor),
                discovered_at: d.discovered_at,
            })
            .collect();
        let calamities = reg
            .calamities
            .values()
            .map(|c| CalamitySummary {
                kind: c.kind,
                settlement: settlement_name(reg, c.settlement),
                tick: c.tick,
                severity: c.severity,
                casualties: c.casualties,
            })
            .collect();
        let enterprises = reg
            .enterprises
            .values()
            .map(|e| EnterpriseSummary {
                name: e.name.clone(),
                owner: name_of(reg, e.owner),
                state: e.state,
                wealth: e.wealth,
            })
            .collect();

        let roots: Vec<PersonId> = reg.founders.map(|(m, f)| vec![m, f]).unwrap_or_default();
        let genealogy = build_tree(reg, &roots, GENEALOGY_MAX_DEPTH, GENEALOGY_MAX_NODES);
        let mut memo = DepthMemo::new();
        let max_lineage_depth = reg
            .living
            .iter()
            .map(|id| memo.ancestry_depth(reg, *id))
            .max()
            .unwrap_or(0);
        let lineage: BTreeSet<PersonId> = roots.iter().flat_map(|r| descendants(reg, *r)).collect();
        let founder_descendants = lineage.iter().filter(|id| reg.is_alive(**id)).count();

        Self {
            run_id,
            tick: now,
            year: clock.year(),
            living: reg.living_count(),
            dead: reg.dead.len(),
            males,
            females,
            max_generation: reg.people.values().map(|p| p.generation).max().unwrap_or(0),
            max_lineage_depth,
            founder_descendants,
            recent_events: events.tail(EVENT_TAIL),
            occupations,
            settlements,
            polities,
            discoveries,
            calamities,
            enterprises,
            schools: institutions(reg, InstitutionKind::School),
            universities: institutions(reg, InstitutionKind::University),
            genealogy,
            ended: end_reason.is_some(),
            end_reason,
        }
    }
}
