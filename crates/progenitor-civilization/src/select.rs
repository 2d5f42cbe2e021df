//! Candidate selection shared by the yearly events.
//!
//! Every selection is deterministic: candidates are visited in ascending
//! handle order and the first candidate with the highest key wins.

use progenitor_types::{Individual, PersonId, SettlementId, Tick};
use progenitor_population::Registries;

/// Living individuals aged at least `min_age`.
pub fn adults(reg: &Registries, now: Tick, min_age: u32) -> impl Iterator<Item = &Individual> {
    reg.living_people().filter(move |p| p.age_years(now) >= min_age)
}

/// Living residents of `settlement` aged at least `min_age`.
pub fn adult_residents(
    reg: &Registries,
    settlement: SettlementId,
    now: Tick,
    min_age: u32,
) -> impl Iterator<Item = &Individual> {
    reg.residents(settlement)
        .filter(move |p| p.age_years(now) >= min_age)
}

/// The candidate with the highest `key`; the earliest handle wins ties.
pub fn best_by<'a, K: Ord>(
    candidates: impl Iterator<Item = &'a Individual>,
    key: impl Fn(&Individual) -> K,
) -> Option<PersonId> {
    let mut best: Option<(PersonId, K)> = None;
    for person in candidates {
        let k = key(person);
        if best.as_ref().is_none_or(|(_, top)| k > *top) {
            best = Some((person.id, k));
        }
    }
    best.map(|(id, _)| id)
}

/// An individual, their living spouse, and their living unmarried children.
pub fn household(reg: &Registries, id: PersonId) -> Vec<PersonId> {
    let Some(head) = reg.living_person(id) else {
        return Vec::new();
    };
    let mut members = vec![id];
    members.extend(head.spouse.filter(|s| reg.is_alive(*s)));
    members.extend(
        head.children
            .iter()
            .filter_map(|c| reg.living_person(*c))
            .filter(|c| c.spouse.is_none())
            .map(|c| c.id),
    );
    members.sort_unstable();
    members.dedup();
    members
}


#[cfg(test)]
mod tests {
    use progenitor_types::Sex;

    use super::fixtures::{NOW, adult};
    use super::*;

    #[test]
    fn ties_go_to_earliest_handle() {
        let mut reg = Registries::default();
        let first = reg.insert_person(|_| adult(Sex::Male, 30, 70));
        reg.insert_person(|_| adult(Sex::Female, 30, 70));
        let chosen = best_by(adults(&reg, NOW, 18), |p| p.traits.leadership);
        assert_eq!(chosen, Some(first));
    }

    #[test]
    fn minors_are_never_candidates() {
        let mut reg = Registries::default();
        reg.insert_person(|_| adult(Sex::Male, 12, 100));
        assert_eq!(best_by(adults(&reg, NOW, 18), |p| p.traits.leadership), None);
    }

    #[test]
    fn household_includes_spouse_and_unmarried_children() {
        let mut reg = Registries::default();
        let head = reg.insert_person(|_| adult(Sex::Male, 40, 50));
        let wife = reg.insert_person(|_| adult(Sex::Female, 38, 50));
        let child = reg.insert_person(|_| adult(Sex::Female, 10, 50));
        let married = reg.insert_person(|_| adult(Sex::Male, 20, 50));
        let in_law = reg.insert_person(|_| adult(Sex::Female, 20, 50));
        for (id, spouse) in [(head, wife), (wife, head), (married, in_law), (in_law, married)] {
            if let Some(p) = reg.person_mut(id) {
                p.spouse = Some(spouse);
            }
        }
        if let Some(p) = reg.person_mut(head) {
            p.children = vec![child, married];
        }
        assert_eq!(household(&reg, head), vec![head, wife, child]);
    }
}
