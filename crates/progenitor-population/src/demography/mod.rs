//! The daily lifecycle routines.
//!
//! [`run_day`] executes them in a fixed order each tick:
//! death, education, occupation, marriage, pregnancy, birth.
//!
//! # Submodules
//!
//! - [`death`] -- Mortality hazard, cause of death, succession and inheritance.
//! - [`education`] -- Enrollment, literacy, graduation.
//! - [`occupation`] -- The unemployed index and occupation matching.
//! - [`marriage`] -- Daily matchmaking.
//! - [`pregnancy`] -- Conception and litter size.
//! - [`birth`] -- Delivery and inheritance.

pub mod birth;
pub mod death;
pub mod education;
pub mod marriage;
pub mod occupation;
pub mod pregnancy;

use tracing::debug;

use progenitor_types::{PersonId, Tick};

use crate::catalog::ContentCatalog;
use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::registry::Registries;

pub use education::EducationReport;
pub use occupation::{OccupationIndex, OccupationReport};

/// What happened during one day of demographic processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyReport {
    /// Individuals who died.
    pub deaths: Vec<PersonId>,
    /// Education changes.
    pub education: EducationReport,
    /// Employment changes.
    pub occupation: OccupationReport,
    /// New couples.
    pub marriages: Vec<(PersonId, PersonId)>,
    /// Mothers who conceived.
    pub conceptions: Vec<PersonId>,
    /// Newborns.
    pub births: Vec<PersonId>,
}

/// Run every daily routine for `now`.
pub fn run_day(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    catalog: &ContentCatalog,
    index: &mut OccupationIndex,
    now: Tick,
) -> DailyReport {
    let deaths = death::process(reg, ctx, config, now);
    let education = education::process(reg, ctx, config, now);
    let occupation = occupation::process(reg, ctx, config, index, now);
    let marriages = marriage::process(reg, ctx, config, now);
    let conceptions = pregnancy::process(reg, ctx, config, now);
    let births = birth::process(reg, ctx, config, catalog, now);
    debug!(
        tick = now,
        deaths = deaths.len(),
        marriages = marriages.len(),
        conceptions = conceptions.len(),
        births = births.len(),
        living = reg.living_count(),
        "day processed"
    );
    DailyReport {
        deaths,
        education,
        occupation,
        marriages,
        conceptions,
        births,
    }
}
