//! Name generation from the content catalog's pools.

use rand::Rng;
use rand::seq::IndexedRandom;

use progenitor_types::Sex;

use crate::catalog::ContentCatalog;

/// Placeholder given name when the pool for a sex is empty.
pub const FALLBACK_GIVEN_NAME: &str = "Unnamed";

/// Placeholder surname when both surname pools are empty.
pub const FALLBACK_SURNAME: &str = "Nameless";

/// A random given name for a child of `sex`.
pub fn given_name(catalog: &ContentCatalog, sex: Sex, rng: &mut impl Rng) -> String {
    let pool = match sex {
        Sex::Male => &catalog.male_names,
        Sex::Female => &catalog.female_names,
    };
    pool.choose(rng)
        .cloned()
        .unwrap_or_else(|| FALLBACK_GIVEN_NAME.to_owned())
}

/// A random surname built from a prefix and a suffix.
pub fn surname(catalog: &ContentCatalog, rng: &mut impl Rng) -> String {
    let prefix = catalog.surname_prefixes.choose(rng);
    let suffix = catalog.surname_suffixes.choose(rng);
    match (prefix, suffix) {
        (Some(p), Some(s)) => format!("{p}{s}"),
        (Some(p), None) => p.clone(),
        (None, Some(s)) => capitalize(s),
        (None, None) => FALLBACK_SURNAME.to_owned(),
    }
}

/// The `ordinal`-th name of `pool`, or `"{fallback} {ordinal+1}"` once the
/// pool is exhausted.
pub fn nth_or_numbered(pool: &[String], ordinal: usize, fallback: &str) -> String {
    pool.get(ordinal)
        .cloned()
        .unwrap_or_else(|| format!("{fallback} {}", ordinal.saturating_add(1)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn empty_catalog_falls_back() {
        let catalog = ContentCatalog::empty();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(given_name(&catalog, Sex::Female, &mut rng), FALLBACK_GIVEN_NAME);
        assert_eq!(surname(&catalog, &mut rng), FALLBACK_SURNAME);
    }

    #[test]
    fn names_come_from_the_pool_for_the_sex() {
        let catalog = ContentCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let name = given_name(&catalog, Sex::Male, &mut rng);
            assert!(catalog.male_names.contains(&name));
        }
    }

    #[test]
    fn suffix_only_surname_is_capitalized() {
        let catalog = ContentCatalog {
            surname_suffixes: vec![String::from("wood")],
            ..ContentCatalog::empty()
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(surname(&catalog, &mut rng), "Wood");
    }

    #[test]
    fn numbered_fallback_after_pool() {
        let pool = vec![String::from("Ashby")];
        assert_eq!(nth_or_numbered(&pool, 0, "Settlement"), "Ashby");
        assert_eq!(nth_or_numbered(&pool, 1, "Settlement"), "Settlement 2");
    }
}
