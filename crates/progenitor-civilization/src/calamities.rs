//! Natural calamities.
//!
//! Every year each settlement rolls once per calamity kind. The annual
//! probability is the terrain rate scaled by a climate factor:
//!
//! | Kind       | Plains | River | Coastal | Mountain | Forest | Desert |
//! |------------|--------|-------|---------|----------|--------|--------|
//! | Flood      | 1.0%   | 4.0%  | 3.0%    | 0.5%     | 1.0%   | 0.2%   |
//! | Drought    | 2.0%   | 1.0%  | 1.0%    | 1.0%     | 1.0%   | 5.0%   |
//! | Earthquake | 0.3%   | 0.3%  | 0.5%    | 2.0%     | 0.3%   | 0.5%   |
//! | Plague     | 1.0%   | 1.5%  | 1.5%    | 0.5%     | 1.0%   | 0.5%   |
//! | Famine     | 1.5%   | 1.0%  | 1.0%    | 2.0%     | 1.0%   | 3.0%   |
//! | Storm      | 1.5%   | 1.0%  | 4.0%    | 1.5%     | 1.0%   | 1.0%   |
//! | Wildfire   | 1.0%   | 0.5%  | 0.5%    | 1.0%     | 3.0%   | 1.0%   |
//! | Eruption   | 0%     | 0%    | 0.1%    | 0.5%     | 0%     | 0%     |
//!
//! Known discoveries mitigate the damage: medicine against plague,
//! agriculture against famine and drought, engineering against everything
//! that damages buildings.

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use tracing::info;

use progenitor_types::{
    CalamityEvent, CalamityId, CalamityKind, CauseOfDeath, Climate, DiscoveryCategory,
    EventCategory, PersonId, SettlementId, Terrain, Tick,
};
use progenitor_population::demography::death;
use progenitor_population::{DemographyConfig, Registries, SimContext};

use crate::config::CivilizationConfig;

/// Annual base probability of `kind` on `terrain`.
pub const fn terrain_rate(kind: CalamityKind, terrain: Terrain) -> f64 {
    use CalamityKind as K;
    use Terrain as T;
    match (kind, terrain) {
        (K::Flood, T::River) => 0.04,
        (K::Flood, T::Coastal) => 0.03,
        (K::Flood, T::Mountain) => 0.005,
        (K::Flood, T::Desert) => 0.002,
        (K::Flood | K::Wildfire | K::Plague, T::Plains) => 0.01,
        (K::Flood | K::Drought | K::Famine | K::Storm | K::Plague, T::Forest) => 0.01,
        (K::Drought, T::Plains) => 0.02,
        (K::Drought, T::Desert) => 0.05,
        (K::Drought | K::Famine | K::Storm, T::River) => 0.01,
        (K::Drought | K::Famine, T::Coastal) => 0.01,
        (K::Drought | K::Storm, T::Desert) => 0.01,
        (K::Drought | K::Wildfire, T::Mountain) => 0.01,
        (K::Earthquake, T::Mountain) => 0.02,
        (K::Earthquake, T::Coastal | T::Desert) => 0.005,
        (K::Earthquake, _) => 0.003,
        (K::Plague, T::River | T::Coastal) => 0.015,
        (K::Plague, T::Mountain | T::Desert) => 0.005,
        (K::Famine | K::Storm, T::Plains) => 0.015,
        (K::Famine, T::Mountain) => 0.02,
        (K::Famine, T::Desert) => 0.03,
        (K::Storm, T::Coastal) => 0.04,
        (K::Storm, T::Mountain) => 0.015,
        (K::Wildfire, T::Forest) => 0.03,
        (K::Wildfire, T::Desert) => 0.01,
        (K::Wildfire, T::River | T::Coastal) => 0.005,
        (K::Eruption, T::Mountain) => 0.005,
        (K::Eruption, T::Coastal) => 0.001,
        (K::Eruption, _) => 0.0,
    }
}

/// Climate multiplier on the terrain rate of `kind`.
pub const fn climate_factor(kind: CalamityKind, climate: Climate) -> f64 {
    use CalamityKind as K;
    match (climate, kind) {
        (Climate::Tropical, K::Flood | K::Storm | K::Plague) => 1.5,
        (Climate::Tropical, K::Drought) => 0.5,
        (Climate::Arid, K::Drought | K::Wildfire) => 2.0,
        (Climate::Arid, K::Famine) => 1.5,
        (Climate::Arid, K::Flood) => 0.5,
        (Climate::Cold, K::Famine) => 1.5,
        (Climate::Cold, K::Storm) => 1.2,
        (Climate::Cold, K::Plague) => 0.7,
        (Climate::Cold, K::Wildfire) => 0.3,
        _ => 1.0,
    }
}

/// Annual probability of `kind` striking a settlement.
pub fn annual_probability(kind: CalamityKind, terrain: Terrain, climate: Climate) -> f64 {
    (terrain_rate(kind, terrain) * climate_factor(kind, climate)).clamp(0.0, 1.0)
}

/// Deaths per thousand residents per severity point.
pub const fn lethality_per_mille(kind: CalamityKind) -> u64 {
    match kind {
        CalamityKind::Plague | CalamityKind::Eruption => 50,
        CalamityKind::Earthquake => 30,
        CalamityKind::Flood | CalamityKind::Famine => 20,
        CalamityKind::Wildfire => 15,
        CalamityKind::Drought | CalamityKind::Storm => 10,
    }
}

/// The discovery category that mitigates `kind`.
pub const fn mitigating_category(kind: CalamityKind) -> DiscoveryCategory {
    match kind {
        CalamityKind::Plague => DiscoveryCategory::Medicine,
        CalamityKind::Famine | CalamityKind::Drought => DiscoveryCategory::Agriculture,
        CalamityKind::Flood
        | CalamityKind::Earthquake
        | CalamityKind::Storm
        | CalamityKind::Wildfire
        | CalamityKind::Eruption => DiscoveryCategory::Engineering,
    }
}

/// Mitigation against `kind` from known discoveries, in whole percent.
pub fn mitigation_pct(reg: &Registries, config: &CivilizationConfig, kind: CalamityKind) -> u8 {
    let category = mitigating_category(kind);
    let known = reg.discoveries.values().filter(|d| d.category == category).count();
    let per = (config.mitigation_per_discovery.clamp(0.0, 1.0) * 100.0).round() as u64;
    let cap = (config.mitigation_cap.clamp(0.0, 1.0) * 100.0).round() as u64;
    let pct = (known as u64).saturating_mul(per).min(cap).min(100);
    u8::try_from(pct).unwrap_or(100)
}

/// One calamity aimed at one settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    /// Settlement hit.
    pub settlement: SettlementId,
    /// What strikes.
    pub kind: CalamityKind,
    /// Severity, clamped to `1..=10` when applied.
    pub severity: u8,
    /// Tick it strikes.
    pub at: Tick,
}

impl Strike {
    /// A strike of `kind` on `settlement` with a uniformly drawn severity.
    pub fn roll<R: Rng + ?Sized>(
        settlement: SettlementId,
        kind: CalamityKind,
        at: Tick,
        rng: &mut R,
    ) -> Self {
        Self {
            settlement,
            kind,
            severity: rng.random_range(1..=10),
            at,
        }
    }
}

/// Apply `blow` to its settlement. Returns `None` when the settlement is
/// gone or has no residents.
pub fn strike(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    demography: &DemographyConfig,
    blow: Strike,
) -> Option<CalamityId> {
    let Strike {
        settlement,
        kind,
        severity,
        at: now,
    } = blow;
    let name = reg.settlements.get(settlement)?.name.clone();
    let residents: Vec<PersonId> = reg.residents(settlement).map(|p| p.id).collect();
    if residents.is_empty() {
        return None;
    }
    let severity = severity.clamp(1, 10);
    let pct = mitigation_pct(reg, config, kind);
    let n = residents.len() as u64;
    let sev = u64::from(severity);
    let spared = u64::from(100 - pct);

    let casualties = (n * sev * lethality_per_mille(kind) * spared / 100_000).min(n);
    let victims: Vec<PersonId> = residents
        .choose_multiple(&mut ctx.rng, casualties as usize)
        .copied()
        .collect();
    let mut dead = 0_u32;
    for victim in &victims {
        if death::apply_death(reg, ctx, demography, *victim, now, CauseOfDeath::Calamity { kind }) {
            dead += 1;
        }
    }

    let survivors: Vec<PersonId> = residents
        .iter()
        .copied()
        .filter(|id| reg.is_alive(*id))
        .collect();
    let displaced_count = (n * sev * 2 / 100).min(survivors.len() as u64);
    let displaced: Vec<PersonId> = survivors
        .choose_multiple(&mut ctx.rng, displaced_count as usize)
        .copied()
        .collect();
    for person in &displaced {
        if let Some(p) = reg.person_mut(*person) {
            p.settlement = None;
            p.institution = None;
        }
    }
    for institution in reg.institutions.values_mut() {
        institution.enrolled.retain(|s| !displaced.contains(s));
    }

    if let Some(s) = reg.settlements.get_mut(settlement) {
        if s.wealth > Decimal::ZERO {
            let damage = s.wealth * Decimal::from(sev * 5 * spared) / Decimal::from(10_000);
            s.wealth -= damage.min(s.wealth);
        }
    }

    let id = reg.calamities.insert_with_key(|id| CalamityEvent {
        id,
        kind,
        settlement,
        tick: now,
        severity,
        casualties: dead,
        displaced: u32::try_from(displaced.len()).unwrap_or(u32::MAX),
        mitigation_pct: pct,
    });
    info!(
        tick = now,
        settlement = %settlement,
        %kind,
        severity,
        casualties = dead,
        displaced = displaced.len(),
        "calamity struck"
    );
    ctx.record(
        now,
        EventCategory::Calamity,
        format!("A {kind} of severity {severity} struck {name}, killing {dead}"),
        victims,
    );
    Some(id)
}

/// Roll every calamity kind against every settlement.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    demography: &DemographyConfig,
    now: Tick,
) -> Vec<CalamityId> {
    let sites: Vec<(SettlementId, Terrain, Climate)> = reg
        .settlements
        .values()
        .map(|s| (s.id, s.terrain, s.climate))
        .collect();
    let mut struck = Vec::new();
    for (settlement, terrain, climate) in sites {
        for kind in CalamityKind::ALL {
            if !ctx.rng.random_bool(annual_probability(kind, terrain, climate)) {
                continue;
            }
            let blow = Strike::roll(settlement, kind, now, &mut ctx.rng);
            struck.extend(strike(reg, ctx, config, demography, blow));
        }
    }
    struck
}
