//! Daily schooling: enrollment, literacy, stage progression, graduation,
//! and the yearly parental intelligence boost.

use rand::Rng;
use tracing::{debug, info};

use progenitor_types::{
    EducationStage, EventCategory, InstitutionId, InstitutionKind, PersonId, SettlementId, Tick,
};

use crate::config::DemographyConfig;
use crate::context::SimContext;
use crate::registry::Registries;

/// Age at which a school pupil completes primary schooling.
pub const PRIMARY_COMPLETION_AGE: u32 = 10;

/// Summary of one day of schooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EducationReport {
    /// Newly enrolled students.
    pub enrolled: u32,
    /// Students who became literate.
    pub literate: u32,
    /// Graduates.
    pub graduated: Vec<PersonId>,
}

/// Intelligence boost a parent at `stage` grants a minor child yearly.
pub const fn parent_boost(stage: EducationStage, literate: bool) -> u8 {
    if !literate {
        return 0;
    }
    match stage {
        EducationStage::Secondary => 1,
        EducationStage::Higher => 2,
        EducationStage::None | EducationStage::Primary => 0,
    }
}

/// The institution kind an individual of `age` at `stage` should attend.
pub const fn wanted_kind(
    config: &DemographyConfig,
    age: u32,
    stage: EducationStage,
) -> Option<InstitutionKind> {
    let at_school_age = age >= config.school_min_age && age <= config.school_max_age;
    let at_university_age = age >= config.university_min_age && age <= config.university_max_age;
    match stage {
        EducationStage::None | EducationStage::Primary if at_school_age => {
            Some(InstitutionKind::School)
        }
        EducationStage::Secondary if at_university_age => Some(InstitutionKind::University),
        _ => None,
    }
}

/// The stage completed at `age` in an institution of `kind`, if any.
pub fn stage_reached(
    config: &DemographyConfig,
    kind: InstitutionKind,
    age: u32,
    current: EducationStage,
) -> Option<EducationStage> {
    match kind {
        InstitutionKind::School => {
            if current == EducationStage::Primary && age >= config.school_max_age {
                Some(EducationStage::Secondary)
            } else if current == EducationStage::None && age >= PRIMARY_COMPLETION_AGE {
                Some(EducationStage::Primary)
            } else {
                None
            }
        }
        InstitutionKind::University => (current == EducationStage::Secondary
            && age >= config.university_max_age)
            .then_some(EducationStage::Higher),
    }
}

const fn terminal_stage(kind: InstitutionKind) -> EducationStage {
    match kind {
        InstitutionKind::School => EducationStage::Secondary,
        InstitutionKind::University => EducationStage::Higher,
    }
}

fn free_institution(
    reg: &Registries,
    settlement: SettlementId,
    kind: InstitutionKind,
) -> Option<InstitutionId> {
    reg.institutions_in(settlement, kind)
        .find(|i| i.has_space())
        .map(|i| i.id)
}

fn leave(reg: &mut Registries, id: PersonId, institution: InstitutionId) {
    if let Some(inst) = reg.institutions.get_mut(institution) {
        inst.enrolled.remove(&id);
    }
    if let Some(person) = reg.person_mut(id) {
        person.institution = None;
    }
}

fn apply_parent_boost(reg: &mut Registries, id: PersonId, now: Tick) {
    let Some(child) = reg.living_person(id) else {
        return;
    };
    if !child.is_birthday(now) || child.age_years(now) >= 18 {
        return;
    }
    let boost = [child.father, child.mother]
        .into_iter()
        .flatten()
        .filter_map(|p| reg.person(p))
        .map(|p| parent_boost(p.education, p.literate))
        .max()
        .unwrap_or(0);
    if boost > 0 {
        if let Some(child) = reg.person_mut(id) {
            child.traits.intelligence = child.traits.intelligence.saturating_add(boost).min(100);
        }
    }
}

/// Run one day of schooling for every living individual.
pub fn process(
    reg: &mut Registries,
    ctx: &mut SimContext,
    config: &DemographyConfig,
    now: Tick,
) -> EducationReport {
    let mut report = EducationReport::default();
    for id in reg.living_ids() {
        apply_parent_boost(reg, id, now);

        let Some(person) = reg.living_person(id) else {
            continue;
        };
        let age = person.age_years(now);
        let stage = person.education;
        let wanted = wanted_kind(config, age, stage);

        // Leave an institution the student has aged out of.
        if let Some(current) = person.institution {
            let current_kind = reg.institutions.get(current).map(|i| i.kind);
            if current_kind.is_none() || current_kind != wanted {
                leave(reg, id, current);
            }
        }

        let Some(person) = reg.living_person(id) else {
            continue;
        };
        let institution = match (person.institution, wanted, person.settlement) {
            (Some(current), _, _) => current,
            (None, Some(kind), Some(settlement)) => {
                let Some(found) = free_institution(reg, settlement, kind) else {
                    continue;
                };
                if let Some(inst) = reg.institutions.get_mut(found) {
                    inst.enrolled.insert(id);
                }
                if let Some(p) = reg.person_mut(id) {
                    p.institution = Some(found);
                }
                report.enrolled = report.enrolled.saturating_add(1);
                debug!(tick = now, person = %id, institution = %found, "enrolled");
                found
            }
            _ => continue,
        };

        let Some(inst) = reg.institutions.get(institution) else {
            continue;
        };
        let kind = inst.kind;
        let quality = inst.quality.min(100);
        let prestige = inst.prestige;
        let inst_name = inst.name.clone();

        let chance = (f64::from(quality) / 100.0 * config.literacy_daily_chance).clamp(0.0, 1.0);
        if ctx.rng.random_bool(chance) {
            if let Some(p) = reg.person_mut(id) {
                if !p.literate {
                    report.literate = report.literate.saturating_add(1);
                }
                p.literate = true;
                p.traits.intelligence = p.traits.intelligence.saturating_add(1).min(100);
            }
        }

        let Some(reached) = stage_reached(config, kind, age, stage) else {
            continue;
        };
        let Some(p) = reg.person_mut(id) else {
            continue;
        };
        p.education = reached;
        if reached != terminal_stage(kind) {
            continue;
        }

        let name = p.full_name();
        let becomes_notable = prestige > config.notable_graduation_prestige && !p.notable;
        if becomes_notable {
            p.notable = true;
            p.notability_reason = Some(format!("graduated with distinction from {inst_name}"));
        }
        leave(reg, id, institution);
        if let Some(inst) = reg.institutions.get_mut(institution) {
            inst.graduates = inst.graduates.saturating_add(1);
        }
        ctx.record(
            now,
            EventCategory::Education,
            format!("{name} graduated from {inst_name}"),
            vec![id],
        );
        if becomes_notable {
            info!(tick = now, person = %id, institution = %institution, "notable graduate");
            ctx.record(
                now,
                EventCategory::Notability,
                format!("{name} graduated with distinction from {inst_name}"),
                vec![id],
            );
        }
        report.graduated.push(id);
    }
    report
}
