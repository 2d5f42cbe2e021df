//! Trait and genome inheritance.
//!
//! Every function here is pure given its inputs and the random stream it
//! is handed. Scores are computed in `i32` and clamped to `0..=100` at the
//! point of computation, so no inherited score can leave its range.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use progenitor_types::{
    BloodGroup, BloodType, Build, EyeColor, Genome, HairColor, HereditaryCondition, Nucleotide,
    Physique, RhFactor, Sex, SkinTone, Traits,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of every primordial sequence.
pub const SEQUENCE_LENGTH: usize = 32;

/// Per-position point mutation chance during inheritance.
pub const MUTATION_RATE: f64 = 0.02;

/// Chance that a parent passes its whole condition set.
pub const CONDITION_TRANSMISSION_CHANCE: f64 = 0.10;

/// Chance of one spontaneous condition per child.
pub const SPONTANEOUS_CONDITION_CHANCE: f64 = 0.03;

/// Chance of an extra perturbation when inheriting a trait.
pub const TRAIT_PERTURBATION_CHANCE: f64 = 0.05;

/// Chance that a colour trait is a random variant rather than a parent's.
pub const COLOUR_VARIANT_CHANCE: f64 = 0.05;

/// Motifs recognised as genetic markers, with their marker names.
pub const MARKER_MOTIFS: [(&str, &str); 6] = [
    ("TATA", "tata-box"),
    ("GATA", "gata-site"),
    ("CCGG", "cpg-island"),
    ("GCGC", "gc-clamp"),
    ("AATT", "at-hook"),
    ("ACGT", "palindrome"),
];

/// Baseline disease resistance and longevity of the founding pair.
const FOUNDER_GENETIC_BASELINE: u8 = 80;

fn clamp_score(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

fn average(a: u8, b: u8) -> i32 {
    (i32::from(a) + i32::from(b)) / 2
}

fn random_nucleotide(rng: &mut impl Rng) -> Nucleotide {
    Nucleotide::ALPHABET
        .choose(rng)
        .copied()
        .unwrap_or(Nucleotide::A)
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// A fresh sequence of [`SEQUENCE_LENGTH`] uniformly random symbols.
pub fn primordial_sequence(rng: &mut impl Rng) -> Vec<Nucleotide> {
    (0..SEQUENCE_LENGTH).map(|_| random_nucleotide(rng)).collect()
}

/// Recombine two parental sequences.
///
/// Each position takes the father's or the mother's symbol with equal
/// probability, then independently mutates to a uniform random symbol
/// with [`MUTATION_RATE`]. Positions beyond the shorter parent are taken
/// from the longer one. If either side is empty the child receives a
/// primordial sequence.
pub fn inherit(father: &[Nucleotide], mother: &[Nucleotide], rng: &mut impl Rng) -> Vec<Nucleotide> {
    if father.is_empty() || mother.is_empty() {
        return primordial_sequence(rng);
    }
    let length = father.len().max(mother.len());
    (0..length)
        .map(|i| {
            let symbol = match (father.get(i), mother.get(i)) {
                (Some(f), Some(m)) => {
                    if rng.random_bool(0.5) {
                        *f
                    } else {
                        *m
                    }
                }
                (Some(only), None) | (None, Some(only)) => *only,
                (None, None) => Nucleotide::A,
            };
            if rng.random_bool(MUTATION_RATE) {
                random_nucleotide(rng)
            } else {
                symbol
            }
        })
        .collect()
}

/// Number of strong-bond (G/C) symbols.
pub fn strong_bond_count(sequence: &[Nucleotide]) -> usize {
    sequence.iter().filter(|n| n.is_strong_bond()).count()
}

/// Number of positions equal to their predecessor.
pub fn adjacent_repeats(sequence: &[Nucleotide]) -> usize {
    sequence.windows(2).filter(|w| w.first() == w.get(1)).count()
}

/// The markers of [`MARKER_MOTIFS`] present in the sequence.
pub fn genetic_markers(sequence: &[Nucleotide]) -> BTreeSet<String> {
    let text: String = sequence.iter().map(|n| n.as_char()).collect();
    MARKER_MOTIFS
        .iter()
        .filter(|(motif, _)| text.contains(motif))
        .map(|(_, marker)| (*marker).to_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Blood type
// ---------------------------------------------------------------------------

/// Legal ABO outcomes for a pair of parental groups.
pub const fn abo_outcomes(father: BloodGroup, mother: BloodGroup) -> &'static [BloodGroup] {
    use BloodGroup::{A, AB, B, O};
    match (father, mother) {
        (O, O) => &[O],
        (A, A) | (A, O) | (O, A) => &[A, O],
        (B, B) | (B, O) | (O, B) => &[B, O],
        (AB, O) | (O, AB) => &[A, B],
        (A, B) | (B, A) => &[A, B, AB, O],
        (AB, AB) | (AB, A) | (A, AB) | (AB, B) | (B, AB) => &[A, B, AB],
    }
}

/// Inherit a blood type: ABO uniformly among the legal outcomes; Rh+ with
/// 75% probability when either parent is Rh+, else Rh-.
pub fn inherit_blood_type(father: BloodType, mother: BloodType, rng: &mut impl Rng) -> BloodType {
    let group = abo_outcomes(father.group, mother.group)
        .choose(rng)
        .copied()
        .unwrap_or(BloodGroup::O);
    let either_positive = father.rh == RhFactor::Positive || mother.rh == RhFactor::Positive;
    let rh = if either_positive && rng.random_bool(0.75) {
        RhFactor::Positive
    } else {
        RhFactor::Negative
    };
    BloodType::new(group, rh)
}

/// A uniformly random blood type.
pub fn random_blood_type(rng: &mut impl Rng) -> BloodType {
    let group = [BloodGroup::A, BloodGroup::B, BloodGroup::AB, BloodGroup::O]
        .choose(rng)
        .copied()
        .unwrap_or(BloodGroup::O);
    let rh = if rng.random_bool(0.5) {
        RhFactor::Positive
    } else {
        RhFactor::Negative
    };
    BloodType::new(group, rh)
}

// ---------------------------------------------------------------------------
// Conditions and scores
// ---------------------------------------------------------------------------

/// Inherit hereditary conditions.
///
/// Each parent's non-empty set passes in full with an independent
/// [`CONDITION_TRANSMISSION_CHANCE`]; a spontaneous condition from the
/// catalog is added with [`SPONTANEOUS_CONDITION_CHANCE`].
pub fn inherit_conditions(
    father: &BTreeSet<HereditaryCondition>,
    mother: &BTreeSet<HereditaryCondition>,
    rng: &mut impl Rng,
) -> BTreeSet<HereditaryCondition> {
    let mut conditions = BTreeSet::new();
    for parent in [father, mother] {
        if !parent.is_empty() && rng.random_bool(CONDITION_TRANSMISSION_CHANCE) {
            conditions.extend(parent.iter().copied());
        }
    }
    if rng.random_bool(SPONTANEOUS_CONDITION_CHANCE) {
        if let Some(condition) = HereditaryCondition::CATALOG.choose(rng) {
            conditions.insert(*condition);
        }
    }
    conditions
}

/// Whether a condition set contains a severe condition.
pub fn is_disease(conditions: &BTreeSet<HereditaryCondition>) -> bool {
    conditions.iter().any(|c| c.is_severe())
}

/// Parental average plus 1.5 per G/C symbol above 16, plus noise.
pub fn disease_resistance(father: u8, mother: u8, sequence: &[Nucleotide], rng: &mut impl Rng) -> u8 {
    let strong = i32::try_from(strong_bond_count(sequence)).unwrap_or(i32::MAX);
    let dna_bonus = strong.saturating_sub(16).saturating_mul(3) / 2;
    let noise = rng.random_range(-10..=10);
    clamp_score(average(father, mother) + dna_bonus + noise)
}

/// Parental average plus one, plus a DNA quality term, plus noise.
pub fn longevity(father: u8, mother: u8, sequence: &[Nucleotide], rng: &mut impl Rng) -> u8 {
    let repeats = i32::try_from(adjacent_repeats(sequence)).unwrap_or(i32::MAX);
    let quality = 8_i32.saturating_sub(repeats);
    let noise = rng.random_range(-8..=8);
    clamp_score(average(father, mother) + 1 + quality + noise)
}

/// Average of the parental scores plus noise, an occasional extra
/// perturbation, and `bonus`.
pub fn inherit_trait(father: u8, mother: u8, bonus: i32, rng: &mut impl Rng) -> u8 {
    let mut value = average(father, mother) + rng.random_range(-15..=15);
    if rng.random_bool(TRAIT_PERTURBATION_CHANCE) {
        value += rng.random_range(-20..=20);
    }
    clamp_score(value.saturating_add(bonus))
}

/// Inherit all ten traits with no bonus.
pub fn inherit_traits(father: &Traits, mother: &Traits, rng: &mut impl Rng) -> Traits {
    Traits {
        intelligence: inherit_trait(father.intelligence, mother.intelligence, 0, rng),
        strength: inherit_trait(father.strength, mother.strength, 0, rng),
        health: inherit_trait(father.health, mother.health, 0, rng),
        fertility: inherit_trait(father.fertility, mother.fertility, 0, rng),
        charisma: inherit_trait(father.charisma, mother.charisma, 0, rng),
        creativity: inherit_trait(father.creativity, mother.creativity, 0, rng),
        leadership: inherit_trait(father.leadership, mother.leadership, 0, rng),
        aggression: inherit_trait(father.aggression, mother.aggression, 0, rng),
        wisdom: inherit_trait(father.wisdom, mother.wisdom, 0, rng),
        beauty: inherit_trait(father.beauty, mother.beauty, 0, rng),
    }
}

// ---------------------------------------------------------------------------
// Genome assembly
// ---------------------------------------------------------------------------

/// Build a child's genome. A missing father contributes an empty sequence
/// and no conditions; his scores and blood type mirror the mother's.
pub fn inherit_genome(father: Option<&Genome>, mother: &Genome, rng: &mut impl Rng) -> Genome {
    let empty = BTreeSet::new();
    let father_sequence = father.map_or(&[][..], |f| f.sequence.as_slice());
    let father_conditions = father.map_or(&empty, |f| &f.conditions);
    let sequence = inherit(father_sequence, &mother.sequence, rng);
    let father = father.unwrap_or(mother);
    let blood_type = inherit_blood_type(father.blood_type, mother.blood_type, rng);
    let conditions = inherit_conditions(father_conditions, &mother.conditions, rng);
    let disease_resistance =
        disease_resistance(father.disease_resistance, mother.disease_resistance, &sequence, rng);
    let longevity = longevity(father.longevity, mother.longevity, &sequence, rng);
    Genome {
        markers: genetic_markers(&sequence),
        has_hereditary_disease: is_disease(&conditions),
        sequence,
        blood_type,
        conditions,
        disease_resistance,
        longevity,
    }
}

/// A primordial genome for a founder.
pub fn founder_genome(rng: &mut impl Rng) -> Genome {
    let sequence = primordial_sequence(rng);
    let disease_resistance = disease_resistance(
        FOUNDER_GENETIC_BASELINE,
        FOUNDER_GENETIC_BASELINE,
        &sequence,
        rng,
    );
    let longevity = longevity(
        FOUNDER_GENETIC_BASELINE,
        FOUNDER_GENETIC_BASELINE,
        &sequence,
        rng,
    );
    Genome {
        markers: genetic_markers(&sequence),
        blood_type: random_blood_type(rng),
        conditions: BTreeSet::new(),
        has_hereditary_disease: false,
        sequence,
        disease_resistance,
        longevity,
    }
}

// ---------------------------------------------------------------------------
// Physique
// ---------------------------------------------------------------------------

/// Classify a build from strength and body-mass index.
pub fn classify_build(strength: u8, height_cm: u16, weight_kg: u16) -> Build {
    let metres = f64::from(height_cm.max(1)) / 100.0;
    let bmi = f64::from(weight_kg) / (metres * metres);
    if bmi < 18.5 {
        Build::Slender
    } else if bmi >= 30.0 {
        Build::Heavy
    } else if strength >= 75 {
        if bmi >= 25.0 { Build::Stocky } else { Build::Athletic }
    } else {
        Build::Average
    }
}

fn inherit_colour<T: Copy>(father: T, mother: T, all: &[T], rng: &mut impl Rng) -> T {
    if rng.random_bool(COLOUR_VARIANT_CHANCE) {
        if let Some(variant) = all.choose(rng) {
            return *variant;
        }
    }
    if rng.random_bool(0.5) { father } else { mother }
}

/// Inherit physical attributes around the parental averages.
pub fn inherit_physique(
    father: &Physique,
    mother: &Physique,
    sex: Sex,
    strength: u8,
    rng: &mut impl Rng,
) -> Physique {
    let sex_offset = match sex {
        Sex::Male => 6,
        Sex::Female => -6,
    };
    let mean_height = (i32::from(father.height_cm) + i32::from(mother.height_cm)) / 2;
    let height = (mean_height + sex_offset + rng.random_range(-8..=8)).clamp(140, 210);
    let mean_weight = (i32::from(father.weight_kg) + i32::from(mother.weight_kg)) / 2;
    let weight = (mean_weight + sex_offset + rng.random_range(-8..=8)).clamp(40, 150);
    let height_cm = u16::try_from(height).unwrap_or(170);
    let weight_kg = u16::try_from(weight).unwrap_or(70);
    Physique {
        height_cm,
        weight_kg,
        build: classify_build(strength, height_cm, weight_kg),
        eye_color: inherit_colour(father.eye_color, mother.eye_color, &EyeColor::ALL, rng),
        hair_color: inherit_colour(father.hair_color, mother.hair_color, &HairColor::ALL, rng),
        skin_tone: inherit_colour(father.skin_tone, mother.skin_tone, &SkinTone::ALL, rng),
    }
}

/// A founder's physique for `sex` and `strength`.
pub fn founder_physique(sex: Sex, strength: u8, rng: &mut impl Rng) -> Physique {
    let (height, weight): (u16, u16) = match sex {
        Sex::Male => (rng.random_range(170..=185), rng.random_range(68..=85)),
        Sex::Female => (rng.random_range(158..=172), rng.random_range(52..=68)),
    };
    Physique {
        height_cm: height,
        weight_kg: weight,
        build: classify_build(strength, height, weight),
        eye_color: EyeColor::ALL.choose(rng).copied().unwrap_or(EyeColor::Brown),
        hair_color: HairColor::ALL.choose(rng).copied().unwrap_or(HairColor::Brown),
        skin_tone: SkinTone::ALL.choose(rng).copied().unwrap_or(SkinTone::Olive),
    }
}
