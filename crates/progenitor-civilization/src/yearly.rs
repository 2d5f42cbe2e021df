//! The yearly cycle.
//!
//! [`run_year`] runs on the last day of every year, after the daily
//! demographic passes, in this order:
//!
//! 1. Payroll and head counts
//! 2. Settlements
//! 3. Polities
//! 4. Belief systems
//! 5. Discoveries
//! 6. Enterprises
//! 7. Learning institutions
//! 8. Calamities
//! 9. Demobilization and conflicts
//!
//! Head counts are refreshed again at the end so the statistics of the
//! following day see the new settlement populations.

use rust_decimal::Decimal;
use tracing::info;

use progenitor_types::{
    BeliefId, CalamityId, ConflictId, DiscoveryId, PersonId, PolityId, SettlementId, Tick,
};
use progenitor_population::{ContentCatalog, DemographyConfig, OccupationIndex, Registries, SimContext};

use crate::config::CivilizationConfig;
use crate::enterprises::EnterpriseReport;
use crate::institutions::InstitutionReport;
use crate::{
    beliefs, calamities, conflicts, discoveries, enterprises, institutions, payroll, polities,
    settlements,
};

/// Every founding and incident of one yearly cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearReport {
    /// Salaries paid before tax.
    pub wages: Decimal,
    /// Taxes collected by settlements.
    pub taxes: Decimal,
    /// Settlement founded this year.
    pub settlement: Option<SettlementId>,
    /// Polity founded this year.
    pub polity: Option<PolityId>,
    /// Belief system founded this year.
    pub belief: Option<BeliefId>,
    /// Discoveries, from both the yearly roll and university research.
    pub discoveries: Vec<DiscoveryId>,
    /// Enterprise activity.
    pub enterprises: EnterpriseReport,
    /// Institution activity.
    pub institutions: InstitutionReport,
    /// Calamities that struck.
    pub calamities: Vec<CalamityId>,
    /// Soldiers released because no conflict is active.
    pub demobilized: Vec<PersonId>,
    /// Conflict begun this year.
    pub conflict: Option<ConflictId>,
}

/// Run one yearly cycle at `now`.
pub fn run_year(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &CivilizationConfig,
    demography: &DemographyConfig,
    catalog: &ContentCatalog,
    index: &mut OccupationIndex,
    now: Tick,
) -> YearReport {
    let pay = payroll::pay_salaries(reg, config);
    payroll::recount(reg);

    let settlement = settlements::process(reg, ctx, config, catalog, now);
    let polity = polities::process(reg, ctx, config, catalog, now);
    let belief = beliefs::process(reg, ctx, config, catalog, now);
    let mut found: Vec<DiscoveryId> = discoveries::process(reg, ctx, config, catalog, index, now)
        .into_iter()
        .collect();
    let enterprises = enterprises::process(reg, ctx, config, catalog, now);
    let institutions = institutions::process(reg, ctx, config, catalog, index, now);
    found.extend(institutions.research_discoveries.iter().copied());
    let calamities = calamities::process(reg, ctx, config, demography, now);
    let demobilized = conflicts::demobilize(reg, index, now);
    let conflict = conflicts::process(reg, ctx, config, demography, index, now);

    payroll::recount(reg);

    info!(
        tick = now,
        year = now / progenitor_types::DAYS_PER_YEAR,
        living = reg.living_count(),
        settlements = reg.settlements.len(),
        polities = reg.polities.len(),
        discoveries = found.len(),
        calamities = calamities.len(),
        at_war = conflict.is_some() || reg.has_active_conflict(now),
        "year completed"
    );

    YearReport {
        wages: pay.wages,
        taxes: pay.taxes,
        settlement,
        polity,
        belief,
        discoveries: found,
        enterprises,
        institutions,
        calamities,
        demobilized,
        conflict,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use progenitor_types::Sex;

    use super::*;
    use crate::select::fixtures::{NOW, adult};

    fn quiet() -> CivilizationConfig {
        CivilizationConfig {
            settlement_chance: 0.0,
            polity_chance: 0.0,
            belief_chance: 0.0,
            discovery_chance: 0.0,
            enterprise_chance: 0.0,
            school_chance: 0.0,
            university_chance: 0.0,
            conflict_chance: 0.0,
            ..CivilizationConfig::default()
        }
    }

    #[test]
    fn quiet_year_changes_nothing() {
        let mut reg = Registries::default();
        for _ in 0..40 {
            reg.insert_person(|_| adult(Sex::Male, 30, 70));
        }
        let mut ctx = SimContext::new(12, 100);
        let mut index = OccupationIndex::new();
        let report = run_year(
            &mut reg,
            &mut ctx,
            &quiet(),
            &DemographyConfig::default(),
            &ContentCatalog::builtin(),
            &mut index,
            NOW,
        );
        assert_eq!(report, YearReport::default());
        assert_eq!(reg.living_count(), 40);
    }

    #[test]
    fn first_settlement_is_counted() {
        let mut reg = Registries::default();
        for _ in 0..30 {
            reg.insert_person(|_| adult(Sex::Female, 25, 60));
        }
        let config = CivilizationConfig {
            settlement_chance: 1.0,
            ..quiet()
        };
        let mut ctx = SimContext::new(12, 100);
        let mut index = OccupationIndex::new();
        let report = run_year(
            &mut reg,
            &mut ctx,
            &config,
            &DemographyConfig::default(),
            &ContentCatalog::builtin(),
            &mut index,
            NOW,
        );
        let home = report.settlement.unwrap();
        let founded = reg.settlements.get(home).unwrap();
        assert_eq!(founded.founded_at, NOW);
        // A calamity may already have struck, so compare with the recount.
        let residents = reg.residents(home).count();
        assert_eq!(founded.population as usize, residents);
        if report.calamities.is_empty() {
            assert_eq!(residents, 30);
        }
    }
}
