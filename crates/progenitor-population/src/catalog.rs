//! Static content consumed read-only by the simulation.
//!
//! A [`ContentCatalog`] bundles the name pools and the occupation and
//! discovery definitions. Every field is optional in a YAML document, and
//! an empty catalog is valid: events that need content simply do not fire
//! and names fall back to placeholders.
//!
//! Each discovery is made at most once per run. Once every definition
//! within reach is known the yearly discovery roll finds nothing, so the
//! size of the discovery table bounds how long a run keeps inventing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use progenitor_types::{DiscoveryCategory, DiscoveryDefinition, Occupation, RoleRestriction};

use crate::error::PopulationError;

/// Name pools plus occupation and discovery definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentCatalog {
    /// Given names for boys.
    pub male_names: Vec<String>,
    /// Given names for girls.
    pub female_names: Vec<String>,
    /// First half of generated surnames.
    pub surname_prefixes: Vec<String>,
    /// Second half of generated surnames.
    pub surname_suffixes: Vec<String>,
    /// Settlement names, used in order before falling back to numbers.
    pub settlement_names: Vec<String>,
    /// Polity names.
    pub polity_names: Vec<String>,
    /// Belief system names.
    pub belief_names: Vec<String>,
    /// Enterprise trades ("Smithy", "Granary").
    pub enterprise_trades: Vec<String>,
    /// Occupation definitions; order is the assignment tie-break order.
    pub occupations: Vec<Occupation>,
    /// Discovery definitions.
    pub discoveries: Vec<DiscoveryDefinition>,
}

impl ContentCatalog {
    /// A catalog with no content at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog from YAML and [`validate`](Self::validate) it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PopulationError> {
        let catalog: Self = serde_yml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that every locked occupation names a defined discovery.
    pub fn validate(&self) -> Result<(), PopulationError> {
        for occupation in &self.occupations {
            let Some(required) = &occupation.requires_discovery else {
                continue;
            };
            if self.discovery(required).is_none() {
                return Err(PopulationError::UnknownDiscovery {
                    occupation: occupation.name.clone(),
                    discovery: required.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up a discovery definition by name.
    pub fn discovery(&self, name: &str) -> Option<&DiscoveryDefinition> {
        self.discoveries.iter().find(|d| d.name == name)
    }

    /// The built-in content set.
    pub fn builtin() -> Self {
        Self {
            male_names: strings(&[
                "Aldric", "Bram", "Cedric", "Dain", "Edwin", "Finn", "Garth", "Hale", "Ivo",
                "Joren", "Kael", "Lorn", "Merek", "Niall", "Osric", "Piers", "Rowan", "Soren",
                "Tobin", "Ulric", "Varn", "Wend", "Yorick",
            ]),
            female_names: strings(&[
                "Aela", "Brynn", "Cora", "Dahlia", "Elowen", "Fera", "Gwen", "Hilde", "Isolde",
                "Jessa", "Kira", "Liora", "Maren", "Nessa", "Orla", "Petra", "Rhea", "Sella",
                "Tamsin", "Una", "Vera", "Wren", "Yara",
            ]),
            surname_prefixes: strings(&[
                "Ash", "Black", "Stone", "River", "Oak", "Iron", "Green", "Frost", "Hawk",
                "Wolf", "Red", "Thorn", "Hill", "Marsh",
            ]),
            surname_suffixes: strings(&[
                "wood", "ford", "field", "vale", "wright", "smith", "well", "brook", "born",
                "hart", "ridge", "stead",
            ]),
            settlement_names: strings(&[
                "Firsthearth", "Rivermouth", "Stonecross", "Ashby", "Greenhollow", "Highmoor",
                "Westmere", "Oakshade", "Saltmarsh", "Ironwell", "Duskwater", "Thornfield",
            ]),
            polity_names: strings(&[
                "the Hearthlands", "the River Compact", "the Stone Crown", "the Ash March",
                "the Green League", "the High Dominion",
            ]),
            belief_names: strings(&[
                "the Way of the Hearth", "the Sky Fathers", "the Old Roots", "the Silent Flame",
                "the River Mothers", "the Sun Covenant",
            ]),
            enterprise_trades: strings(&[
                "Granary", "Smithy", "Tannery", "Brewery", "Pottery", "Weavery", "Mill",
                "Trading House",
            ]),
            occupations: builtin_occupations(),
            discoveries: builtin_discoveries(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// Compact occupation row used to build the built-in table.
struct OccupationRow {
    name: &'static str,
    min_int: u8,
    min_str: u8,
    min_age: u32,
    max_age: Option<u32>,
    restriction: RoleRestriction,
    military: bool,
    salary: i64,
    status: u32,
    risk: f64,
    requires: Option<&'static str>,
}

impl OccupationRow {
    const fn basic(name: &'static str, min_int: u8, min_str: u8, salary: i64, status: u32) -> Self {
        Self {
            name,
            min_int,
            min_str,
            min_age: 14,
            max_age: Some(65),
            restriction: RoleRestriction::Any,
            military: false,
            salary,
            status,
            risk: 1.0,
            requires: None,
        }
    }

    fn into_occupation(self) -> Occupation {
        Occupation {
            name: self.name.to_owned(),
            min_intelligence: self.min_int,
            min_strength: self.min_str,
            min_age: self.min_age,
            max_age: self.max_age,
            restriction: self.restriction,
            military: self.military,
            base_salary: Decimal::from(self.salary),
            status_bonus: self.status,
            death_risk: self.risk,
            requires_discovery: self.requires.map(str::to_owned),
        }
    }
}

fn builtin_occupations() -> Vec<Occupation> {
    let rows = [
        OccupationRow {
            risk: 1.2,
            ..OccupationRow::basic("Hunter", 30, 60, 8, 2)
        },
        OccupationRow::basic("Farmer", 20, 40, 6, 1),
        OccupationRow::basic("Gatherer", 10, 20, 4, 0),
        OccupationRow {
            restriction: RoleRestriction::Female,
            ..OccupationRow::basic("Midwife", 50, 20, 8, 3)
        },
        OccupationRow {
            risk: 1.5,
            ..OccupationRow::basic("Fisher", 20, 50, 7, 1)
        },
        OccupationRow::basic("Potter", 40, 30, 9, 2),
        OccupationRow {
            max_age: Some(55),
            risk: 1.3,
            ..OccupationRow::basic("Builder", 40, 65, 10, 2)
        },
        OccupationRow {
            min_age: 16,
            max_age: Some(55),
            restriction: RoleRestriction::Male,
            risk: 2.0,
            requires: Some("Metallurgy"),
            ..OccupationRow::basic("Miner", 30, 75, 14, 1)
        },
        OccupationRow {
            min_age: 16,
            requires: Some("Metallurgy"),
            ..OccupationRow::basic("Smith", 55, 70, 16, 4)
        },
        OccupationRow {
            min_age: 18,
            max_age: None,
            ..OccupationRow::basic("Healer", 65, 0, 12, 5)
        },
        OccupationRow {
            min_age: 20,
            max_age: None,
            ..OccupationRow::basic("Priest", 60, 0, 10, 6)
        },
        OccupationRow {
            min_age: 16,
            requires: Some("Writing"),
            ..OccupationRow::basic("Scribe", 70, 0, 14, 5)
        },
        OccupationRow {
            min_age: 20,
            requires: Some("Writing"),
            ..OccupationRow::basic("Teacher", 75, 0, 15, 6)
        },
        OccupationRow {
            min_age: 18,
            requires: Some("Currency"),
            ..OccupationRow::basic("Merchant", 60, 20, 20, 6)
        },
        OccupationRow {
            min_age: 24,
            max_age: Some(70),
            requires: Some("Herbal Medicine"),
            ..OccupationRow::basic("Physician", 85, 0, 25, 8)
        },
        OccupationRow {
            min_age: 22,
            requires: Some("Mathematics"),
            ..OccupationRow::basic("Engineer", 85, 30, 24, 7)
        },
        OccupationRow {
            min_age: 16,
            max_age: Some(45),
            military: true,
            risk: 2.5,
            ..OccupationRow::basic("Soldier", 20, 65, 12, 3)
        },
        OccupationRow {
            min_age: 25,
            max_age: Some(60),
            military: true,
            risk: 1.8,
            ..OccupationRow::basic("Commander", 75, 60, 30, 10)
        },
    ];
    rows.into_iter().map(OccupationRow::into_occupation).collect()
}

fn discovery(
    name: &str,
    category: DiscoveryCategory,
    required_intelligence: u8,
    health_bonus: u8,
    lifespan_bonus: u8,
    description: &str,
) -> DiscoveryDefinition {
    DiscoveryDefinition {
        name: name.to_owned(),
        category,
        required_intelligence,
        health_bonus,
        lifespan_bonus,
        description: description.to_owned(),
    }
}

fn builtin_discoveries() -> Vec<DiscoveryDefinition> {
    use DiscoveryCategory::{Agriculture, Commerce, Engineering, Medicine, Military, Science};
    vec![
        discovery("Irrigation", Agriculture, 60, 2, 1, "Channels carry river water to the fields."),
        discovery("Crop Rotation", Agriculture, 70, 3, 1, "Fields rest in turn and yield more."),
        discovery("Granaries", Agriculture, 55, 1, 0, "Grain is stored against lean years."),
        discovery("Herbal Medicine", Medicine, 70, 5, 2, "Plants are catalogued for their cures."),
        discovery("Sanitation", Medicine, 80, 5, 3, "Clean water is kept apart from waste."),
        discovery("Surgery", Medicine, 90, 3, 2, "Wounds and ailments are cut and closed."),
        discovery("Masonry", Engineering, 65, 0, 0, "Stone is dressed and laid in courses."),
        discovery("Metallurgy", Engineering, 80, 0, 0, "Ore is smelted into workable metal."),
        discovery("The Wheel", Engineering, 60, 0, 0, "Loads roll where they were dragged."),
        discovery("Bronze Weapons", Military, 75, 0, 0, "Blades of bronze replace stone."),
        discovery("Fortification", Military, 70, 0, 0, "Walls and ditches guard the town."),
        discovery("Writing", Science, 75, 0, 0, "Speech is set down in marks."),
        discovery("Mathematics", Science, 85, 0, 0, "Quantities are reckoned and recorded."),
        discovery("Astronomy", Science, 90, 0, 0, "The heavens are charted for the calendar."),
        discovery("Currency", Commerce, 70, 0, 0, "Tokens of value ease every exchange."),
        discovery("Ledgers", Commerce, 80, 0, 0, "Debts and goods are kept in account."),
        discovery("Animal Husbandry", Agriculture, 58, 1, 0, "Herds are bred and kept in pens."),
        discovery("The Plough", Agriculture, 72, 2, 1, "Iron shares turn the heavy soil."),
        discovery("Terracing", Agriculture, 84, 1, 0, "Hillsides are stepped into fields."),
        discovery("Selective Breeding", Agriculture, 92, 2, 1, "Seed and stock are chosen for vigour."),
        discovery("Midwifery", Medicine, 74, 3, 1, "Births are attended with learned care."),
        discovery("Quarantine", Medicine, 86, 4, 2, "The sick are kept apart until they mend."),
        discovery("Anatomy", Medicine, 94, 3, 2, "The body is studied part by part."),
        discovery("Inoculation", Medicine, 97, 6, 3, "A mild sickness guards against a deadly one."),
        discovery("Aqueducts", Engineering, 88, 2, 1, "Water is carried by stone across valleys."),
        discovery("Bridges", Engineering, 78, 0, 0, "Rivers are spanned in timber and stone."),
        discovery("Windmills", Engineering, 90, 0, 0, "Wind grinds the grain."),
        discovery("Iron Working", Military, 86, 0, 0, "Iron is forged harder than bronze."),
        discovery("Cavalry", Military, 82, 0, 0, "Riders carry war across the plains."),
        discovery("Siegecraft", Military, 93, 0, 0, "Engines batter down the strongest walls."),
        discovery("Calendar", Science, 80, 0, 0, "Days are counted against the seasons."),
        discovery("Geometry", Science, 92, 0, 0, "Land and figure are measured by rule."),
        discovery("Philosophy", Science, 96, 0, 0, "Reason is turned upon itself."),
        discovery("Optics", Science, 98, 1, 0, "Lenses bend light to aid the eye."),
        discovery("Banking", Commerce, 88, 0, 0, "Coin is lent at interest and held in trust."),
        discovery("Trade Routes", Commerce, 76, 0, 0, "Caravans link distant markets."),
        discovery("Contracts", Commerce, 84, 0, 0, "Promises are bound in writing."),
        discovery("Guilds", Commerce, 90, 0, 0, "Trades govern their own craft and price."),
    ]
}
