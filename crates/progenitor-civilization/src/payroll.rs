//! Yearly salaries, settlement taxes, and head counts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use progenitor_types::{BeliefId, PersonId, SettlementId};
use progenitor_population::Registries;

use crate::config::CivilizationConfig;

/// Totals of one payroll run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayrollReport {
    /// Salaries paid out before tax.
    pub wages: Decimal,
    /// Taxes collected by settlements.
    pub taxes: Decimal,
}

/// Pay every employed individual their occupation's salary. A resident of
/// a settlement keeps the salary minus the settlement's share.
pub fn pay_salaries(reg: &mut Registries, config: &CivilizationConfig) -> PayrollReport {
    let rate = config.settlement_tax_rate.clamp(Decimal::ZERO, Decimal::ONE);
    let payslips: Vec<(PersonId, Decimal, Option<SettlementId>)> = reg
        .living_people()
        .filter_map(|p| {
            let salary = p.occupation.and_then(|o| reg.occupation(o))?.base_salary;
            Some((p.id, salary, p.settlement))
        })
        .collect();

    let mut report = PayrollReport::default();
    for (id, salary, settlement) in payslips {
        let tax = settlement
            .filter(|s| reg.settlements.contains_key(*s))
            .map_or(Decimal::ZERO, |_| salary * rate);
        if let Some(s) = settlement.and_then(|s| reg.settlements.get_mut(s)) {
            s.wealth += tax;
        }
        if let Some(p) = reg.person_mut(id) {
            p.wealth += salary - tax;
        }
        report.wages += salary;
        report.taxes += tax;
    }
    report
}

/// Recount settlement populations and belief adherents.
pub fn recount(reg: &mut Registries) {
    let mut residents: BTreeMap<SettlementId, u32> = BTreeMap::new();
    let mut adherents: BTreeMap<BeliefId, u32> = BTreeMap::new();
    for person in reg.living_people() {
        if let Some(s) = person.settlement {
            *residents.entry(s).or_default() += 1;
        }
        if let Some(b) = person.belief {
            *adherents.entry(b).or_default() += 1;
        }
    }
    for (id, settlement) in &mut reg.settlements {
        settlement.population = residents.get(&id).copied().unwrap_or(0);
    }
    for (id, belief) in &mut reg.beliefs {
        belief.adherents = adherents.get(&id).copied().unwrap_or(0);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use progenitor_types::{Climate, Occupation, OccupationId, RoleRestriction, Settlement, Sex, Terrain};

    use super::*;
    use crate::select::fixtures::adult;

    fn farmer() -> Occupation {
        Occupation {
            name: String::from("Farmer"),
            min_intelligence: 0,
            min_strength: 0,
            min_age: 14,
            max_age: None,
            restriction: RoleRestriction::Any,
            military: false,
            base_salary: dec!(20),
            status_bonus: 0,
            death_risk: 1.0,
            requires_discovery: None,
        }
    }

    #[test]
    fn residents_pay_tax_to_their_settlement() {
        let mut reg = Registries::new(vec![farmer()]);
        let town = reg.settlements.insert_with_key(|id| Settlement {
            id,
            name: String::from("Town"),
            terrain: Terrain::Plains,
            climate: Climate::Temperate,
            founder: None,
            founded_at: 0,
            population: 0,
            wealth: Decimal::ZERO,
            polity: None,
        });
        let mut resident = adult(Sex::Male, 30, 50);
        resident.occupation = Some(OccupationId(0));
        resident.settlement = Some(town);
        let resident = reg.insert_person(|_| resident);
        let mut drifter = adult(Sex::Female, 30, 50);
        drifter.occupation = Some(OccupationId(0));
        let drifter = reg.insert_person(|_| drifter);
        reg.insert_person(|_| adult(Sex::Female, 30, 50));

        let report = pay_salaries(&mut reg, &CivilizationConfig::default());
        assert_eq!(report.wages, dec!(40));
        assert_eq!(report.taxes, dec!(2));
        assert_eq!(reg.person(resident).unwrap().wealth, dec!(18));
        assert_eq!(reg.person(drifter).unwrap().wealth, dec!(20));
        assert_eq!(reg.settlements.get(town).unwrap().wealth, dec!(2));

        recount(&mut reg);
        assert_eq!(reg.settlements.get(town).unwrap().population, 1);
    }
}
