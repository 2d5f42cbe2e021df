//! Shared type definitions for the Progenitor population simulation.
//!
//! This crate is the single source of truth for the entity model used
//! across the workspace: arena handles, enumerations, and the plain-data
//! structs for individuals and the world entities they create.
//!
//! # Modules
//!
//! - [`ids`] -- Generation-checked arena handles and run identifiers
//! - [`enums`] -- Enumeration types (sex, genetics, causes of death, terrain)
//! - [`structs`] -- Core entity structs (individuals, settlements, events)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Archetype, BloodGroup, BloodType, Build, CalamityKind, CauseOfDeath, Climate,
    DiscoveryCategory, EducationStage, EnterpriseState, EventCategory, EyeColor, HairColor,
    HereditaryCondition, InstitutionKind, Nucleotide, ParseBloodTypeError, RhFactor,
    RoleRestriction, Sex, SkinTone, Terrain,
};
pub use ids::{
    BeliefId, CalamityId, ConflictId, DiscoveryId, EnterpriseId, InstitutionId, LineageId,
    OccupationId, PersonId, PolityId, RunId, SettlementId,
};
pub use structs::{
    BeliefSystem, CalamityEvent, Conflict, DAYS_PER_YEAR, Discovery, DiscoveryDefinition,
    DomainEvent, Enterprise, Genome, Individual, LearningInstitution, Lineage, Occupation,
    Physique, Polity, Pregnancy, Settlement, Tick, Traits, years_between,
};
