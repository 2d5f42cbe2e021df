//! Error types for the progenitor-population crate.
//!
//! Daily processing never fails: missing references fall back and
//! ineligible individuals are skipped. Errors are reserved for explicit
//! requests made by callers (catalog loading, forced state changes).

use progenitor_types::PersonId;

/// Errors that can occur during population operations.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// No individual with the given handle exists in the arena.
    #[error("individual not found: {0}")]
    PersonNotFound(PersonId),

    /// The individual exists but cannot take part in the requested change.
    #[error("individual {person} is not eligible: {reason}")]
    NotEligible {
        /// The individual concerned.
        person: PersonId,
        /// Description of why the request was rejected.
        reason: String,
    },

    /// A content catalog document could not be parsed.
    #[error("invalid content catalog: {0}")]
    Catalog(#[from] serde_yml::Error),

    /// A catalog occupation is locked behind a discovery the catalog does
    /// not define.
    #[error("occupation {occupation} requires unknown discovery {discovery}")]
    UnknownDiscovery {
        /// The occupation concerned.
        occupation: String,
        /// The missing discovery name.
        discovery: String,
    },
}
