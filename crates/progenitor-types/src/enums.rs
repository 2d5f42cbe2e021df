//! Enumeration types used across the Progenitor workspace.
//!
//! All role and sex matching is done against closed enums with exhaustive
//! `match`es; no string comparison is involved anywhere in the engine.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Biological sex of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Sex {
    /// The other sex.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl core::fmt::Display for Sex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Which sexes an occupation is open to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleRestriction {
    /// Open to everyone.
    #[default]
    Any,
    /// Only males.
    Male,
    /// Only females.
    Female,
}

impl RoleRestriction {
    /// Whether an individual of `sex` may hold a role with this restriction.
    pub const fn permits(self, sex: Sex) -> bool {
        match (self, sex) {
            (Self::Any, _) | (Self::Male, Sex::Male) | (Self::Female, Sex::Female) => true,
            (Self::Male, Sex::Female) | (Self::Female, Sex::Male) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Genetics
// ---------------------------------------------------------------------------

/// One symbol of the base-4 genetic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Nucleotide {
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Guanine.
    G,
    /// Thymine.
    T,
}

impl Nucleotide {
    /// The four-symbol alphabet in canonical order.
    pub const ALPHABET: [Self; 4] = [Self::A, Self::C, Self::G, Self::T];

    /// Whether this symbol forms a triple hydrogen bond (G or C).
    pub const fn is_strong_bond(self) -> bool {
        matches!(self, Self::G | Self::C)
    }

    /// Single-letter code.
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::T => 'T',
        }
    }
}

/// ABO blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    /// Group A.
    A,
    /// Group B.
    B,
    /// Group AB.
    AB,
    /// Group O.
    O,
}

/// Rhesus factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RhFactor {
    /// Rh positive.
    Positive,
    /// Rh negative.
    Negative,
}

/// Full blood type: ABO group plus Rh factor, displayed as e.g. `AB-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BloodType {
    /// ABO component.
    pub group: BloodGroup,
    /// Rh component.
    pub rh: RhFactor,
}

impl BloodType {
    /// Construct a blood type from its components.
    pub const fn new(group: BloodGroup, rh: RhFactor) -> Self {
        Self { group, rh }
    }
}

impl core::fmt::Display for BloodType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let group = match self.group {
            BloodGroup::A => "A",
            BloodGroup::B => "B",
            BloodGroup::AB => "AB",
            BloodGroup::O => "O",
        };
        let rh = match self.rh {
            RhFactor::Positive => '+',
            RhFactor::Negative => '-',
        };
        write!(f, "{group}{rh}")
    }
}

/// Error returned when parsing a malformed blood type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid blood type: {0:?}")]
pub struct ParseBloodTypeError(pub String);

impl FromStr for BloodType {
    type Err = ParseBloodTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (group, rh) = if let Some(g) = trimmed.strip_suffix('+') {
            (g, RhFactor::Positive)
        } else if let Some(g) = trimmed.strip_suffix('-') {
            (g, RhFactor::Negative)
        } else {
            return Err(ParseBloodTypeError(s.to_owned()));
        };
        let group = match group {
            "A" => BloodGroup::A,
            "B" => BloodGroup::B,
            "AB" => BloodGroup::AB,
            "O" => BloodGroup::O,
            _ => return Err(ParseBloodTypeError(s.to_owned())),
        };
        Ok(Self { group, rh })
    }
}

/// Hereditary conditions from the fixed condition catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HereditaryCondition {
    /// Red-green colour blindness.
    ColorBlindness,
    /// Short-sightedness.
    Myopia,
    /// Chronic airway inflammation.
    Asthma,
    /// Impaired blood sugar regulation.
    Diabetes,
    /// Carrier of the sickle cell trait.
    SickleCell,
    /// Impaired blood clotting.
    Hemophilia,
    /// Thickened mucus in lungs and gut.
    CysticFibrosis,
    /// Progressive neurodegeneration.
    Huntingtons,
}

impl HereditaryCondition {
    /// Every condition, in catalog order.
    pub const CATALOG: [Self; 8] = [
        Self::ColorBlindness,
        Self::Myopia,
        Self::Asthma,
        Self::Diabetes,
        Self::SickleCell,
        Self::Hemophilia,
        Self::CysticFibrosis,
        Self::Huntingtons,
    ];

    /// Whether this condition counts as a hereditary disease.
    pub const fn is_severe(self) -> bool {
        matches!(
            self,
            Self::SickleCell | Self::Hemophilia | Self::CysticFibrosis | Self::Huntingtons
        )
    }
}

impl core::fmt::Display for HereditaryCondition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::ColorBlindness => "colour blindness",
            Self::Myopia => "myopia",
            Self::Asthma => "asthma",
            Self::Diabetes => "diabetes",
            Self::SickleCell => "sickle cell disease",
            Self::Hemophilia => "hemophilia",
            Self::CysticFibrosis => "cystic fibrosis",
            Self::Huntingtons => "Huntington's disease",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Physique
// ---------------------------------------------------------------------------

/// Body build classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Build {
    /// Light frame.
    Slender,
    /// Typical frame.
    Average,
    /// Muscular frame.
    Athletic,
    /// Broad, compact frame.
    Stocky,
    /// Heavy frame.
    Heavy,
}

/// Eye colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EyeColor {
    /// Brown.
    Brown,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Hazel.
    Hazel,
    /// Grey.
    Grey,
}

impl EyeColor {
    /// Every variant.
    pub const ALL: [Self; 5] = [Self::Brown, Self::Blue, Self::Green, Self::Hazel, Self::Grey];
}

/// Hair colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HairColor {
    /// Black.
    Black,
    /// Brown.
    Brown,
    /// Blond.
    Blond,
    /// Red.
    Red,
    /// Auburn.
    Auburn,
}

impl HairColor {
    /// Every variant.
    pub const ALL: [Self; 5] = [Self::Black, Self::Brown, Self::Blond, Self::Red, Self::Auburn];
}

/// Skin tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinTone {
    /// Very light.
    Pale,
    /// Light.
    Fair,
    /// Medium.
    Olive,
    /// Medium-dark.
    Tan,
    /// Dark.
    Dark,
}

impl SkinTone {
    /// Every variant.
    pub const ALL: [Self; 5] = [Self::Pale, Self::Fair, Self::Olive, Self::Tan, Self::Dark];
}

// ---------------------------------------------------------------------------
// Life course
// ---------------------------------------------------------------------------

/// Ordered education stages. Later variants compare greater.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationStage {
    /// No formal schooling.
    #[default]
    None,
    /// Completed primary schooling.
    Primary,
    /// Completed secondary schooling.
    Secondary,
    /// Completed university.
    Higher,
}

/// Kind of learning institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstitutionKind {
    /// Primary and secondary schooling.
    School,
    /// Higher education and research.
    University,
}

/// The archetype of a notable individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Scientific genius.
    Scientific,
    /// Military genius.
    Military,
    /// Diplomatic genius.
    Diplomatic,
    /// Religious visionary.
    Religious,
    /// Artistic genius.
    Artistic,
    /// Economic genius.
    Economic,
    /// Engineering genius.
    Engineering,
    /// Medical genius.
    Medical,
}

impl Archetype {
    /// Every archetype, in classification priority order.
    pub const ALL: [Self; 8] = [
        Self::Scientific,
        Self::Military,
        Self::Diplomatic,
        Self::Religious,
        Self::Artistic,
        Self::Economic,
        Self::Engineering,
        Self::Medical,
    ];
}

impl core::fmt::Display for Archetype {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Scientific => "scientific",
            Self::Military => "military",
            Self::Diplomatic => "diplomatic",
            Self::Religious => "religious",
            Self::Artistic => "artistic",
            Self::Economic => "economic",
            Self::Engineering => "engineering",
            Self::Medical => "medical",
        };
        f.write_str(name)
    }
}

/// Why an individual died.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CauseOfDeath {
    /// Illness in the first year of life.
    InfantIllness,
    /// Disease during childhood.
    ChildhoodDisease,
    /// Accident in a high-risk occupation.
    OccupationalAccident {
        /// Name of the occupation held at death.
        occupation: String,
    },
    /// Long-term illness brought on by poor health.
    ChronicIllness,
    /// A severe hereditary condition.
    HereditaryDisease {
        /// The condition responsible.
        condition: HereditaryCondition,
    },
    /// Natural death in advanced age.
    OldAge,
    /// Illness typical of later life.
    AgeRelatedIllness,
    /// A generic accident.
    Accident,
    /// A fever.
    Fever,
    /// An infection.
    Infection,
    /// Killed by a calamity.
    Calamity {
        /// The calamity kind.
        kind: CalamityKind,
    },
    /// Killed in battle.
    Battle,
}

impl CauseOfDeath {
    /// Generic causes picked uniformly when no specific rule applies.
    pub const GENERIC: [Self; 3] = [Self::Accident, Self::Fever, Self::Infection];
}

impl core::fmt::Display for CauseOfDeath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InfantIllness => write!(f, "infant illness"),
            Self::ChildhoodDisease => write!(f, "childhood disease"),
            Self::OccupationalAccident { occupation } => {
                write!(f, "accident while working as {occupation}")
            }
            Self::ChronicIllness => write!(f, "chronic illness"),
            Self::HereditaryDisease { condition } => write!(f, "{condition}"),
            Self::OldAge => write!(f, "old age"),
            Self::AgeRelatedIllness => write!(f, "age-related illness"),
            Self::Accident => write!(f, "accident"),
            Self::Fever => write!(f, "fever"),
            Self::Infection => write!(f, "infection"),
            Self::Calamity { kind } => write!(f, "{kind}"),
            Self::Battle => write!(f, "battle"),
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Terrain of a settlement site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open grassland.
    Plains,
    /// River valley.
    River,
    /// Sea coast.
    Coastal,
    /// Highlands.
    Mountain,
    /// Woodland.
    Forest,
    /// Sand and scrub.
    Desert,
}

impl Terrain {
    /// Every variant.
    pub const ALL: [Self; 6] = [
        Self::Plains,
        Self::River,
        Self::Coastal,
        Self::Mountain,
        Self::Forest,
        Self::Desert,
    ];
}

/// Climate of a settlement site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Climate {
    /// Mild seasons.
    Temperate,
    /// Hot and wet.
    Tropical,
    /// Hot and dry.
    Arid,
    /// Long winters.
    Cold,
}

impl Climate {
    /// Every variant.
    pub const ALL: [Self; 4] = [Self::Temperate, Self::Tropical, Self::Arid, Self::Cold];
}

/// Kind of calamity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CalamityKind {
    /// River or coastal flooding.
    Flood,
    /// Prolonged absence of rain.
    Drought,
    /// Ground shaking.
    Earthquake,
    /// Epidemic disease.
    Plague,
    /// Food shortage.
    Famine,
    /// Severe storm.
    Storm,
    /// Uncontrolled fire.
    Wildfire,
    /// Volcanic eruption.
    Eruption,
}

impl CalamityKind {
    /// Every variant, in evaluation order.
    pub const ALL: [Self; 8] = [
        Self::Flood,
        Self::Drought,
        Self::Earthquake,
        Self::Plague,
        Self::Famine,
        Self::Storm,
        Self::Wildfire,
        Self::Eruption,
    ];
}

impl core::fmt::Display for CalamityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Flood => "flood",
            Self::Drought => "drought",
            Self::Earthquake => "earthquake",
            Self::Plague => "plague",
            Self::Famine => "famine",
            Self::Storm => "storm",
            Self::Wildfire => "wildfire",
            Self::Eruption => "eruption",
        };
        f.write_str(name)
    }
}

/// Category of a discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiscoveryCategory {
    /// Farming and food storage.
    Agriculture,
    /// Healing and hygiene.
    Medicine,
    /// Construction and machines.
    Engineering,
    /// Weapons and tactics.
    Military,
    /// Writing, mathematics, astronomy.
    Science,
    /// Money, markets, and trade.
    Commerce,
}

/// Lifecycle state of an enterprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnterpriseState {
    /// Expanding.
    Growing,
    /// Holding steady.
    Stable,
    /// Shrinking.
    Declining,
    /// Close to collapse.
    Failing,
    /// Shut down.
    Closed,
}

/// Category tag of a [`DomainEvent`](crate::DomainEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Simulation start, restart, or end.
    Simulation,
    /// A child was born.
    Birth,
    /// An individual died.
    Death,
    /// Two individuals married.
    Marriage,
    /// A woman conceived.
    Pregnancy,
    /// Enrollment or graduation.
    Education,
    /// Employment or retirement.
    Occupation,
    /// An individual was recognised as notable.
    Notability,
    /// A title passed on or lapsed.
    Succession,
    /// A settlement was founded.
    Settlement,
    /// A polity was founded.
    Polity,
    /// A belief system was founded.
    Belief,
    /// Something was discovered.
    Discovery,
    /// An enterprise opened, changed state, or closed.
    Enterprise,
    /// A school or university opened.
    Institution,
    /// A calamity struck.
    Calamity,
    /// A conflict began or ended.
    Conflict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_restriction_is_exhaustive() {
        assert!(RoleRestriction::Any.permits(Sex::Male));
        assert!(RoleRestriction::Any.permits(Sex::Female));
        assert!(RoleRestriction::Male.permits(Sex::Male));
        assert!(!RoleRestriction::Male.permits(Sex::Female));
        assert!(RoleRestriction::Female.permits(Sex::Female));
        assert!(!RoleRestriction::Female.permits(Sex::Male));
    }

    #[test]
    fn blood_type_parse_and_display() {
        let parsed: Result<BloodType, _> = "AB-".parse();
        assert_eq!(
            parsed.ok(),
            Some(BloodType::new(BloodGroup::AB, RhFactor::Negative))
        );
        assert_eq!(BloodType::new(BloodGroup::O, RhFactor::Positive).to_string(), "O+");
        assert!("Q+".parse::<BloodType>().is_err());
        assert!("A".parse::<BloodType>().is_err());
    }

    #[test]
    fn education_stages_are_ordered() {
        assert!(EducationStage::None < EducationStage::Primary);
        assert!(EducationStage::Primary < EducationStage::Secondary);
        assert!(EducationStage::Secondary < EducationStage::Higher);
    }

    #[test]
    fn severe_conditions_subset() {
        let severe: Vec<_> = HereditaryCondition::CATALOG
            .iter()
            .filter(|c| c.is_severe())
            .collect();
        assert_eq!(severe.len(), 4);
        assert!(!HereditaryCondition::Myopia.is_severe());
    }

    #[test]
    fn strong_bond_symbols() {
        let strong = Nucleotide::ALPHABET.iter().filter(|n| n.is_strong_bond()).count();
        assert_eq!(strong, 2);
    }
}
