//! Type-safe identifiers for every entity in the simulation.
//!
//! Entities live in `slotmap` arenas, so every handle is a
//! generation-checked key: a stale handle can never alias a newer entity.
//! Individuals are never removed from their arena, which makes a
//! [`PersonId`] valid for the whole life of a run (and across save/restore,
//! because the arena serializes its slot layout verbatim).
//!
//! Run identifiers are the only UUID-backed ids; they tag persisted
//! snapshots so a sink can tell runs apart.

use serde::{Deserialize, Serialize};
use slotmap::{Key, new_key_type};
use uuid::Uuid;

/// Generates an arena key type with a compact numeric display form.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        new_key_type! {
            $(#[$meta])*
            pub struct $name;
        }

        impl $name {
            /// Slot index of this handle, stable for the life of the entity.
            pub fn index(self) -> u32 {
                // `as_ffi` packs the version in the high half, the index in the low half.
                (self.data().as_ffi() & 0xFFFF_FFFF) as u32
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

define_key! {
    /// Handle for an individual. Resolves for living and dead alike.
    PersonId
}

define_key! {
    /// Handle for a settlement.
    SettlementId
}

define_key! {
    /// Handle for a polity (a settlement promoted to a political unit).
    PolityId
}

define_key! {
    /// Handle for a belief system.
    BeliefId
}

define_key! {
    /// Handle for a recorded discovery.
    DiscoveryId
}

define_key! {
    /// Handle for a lineage (a named family line, e.g. a ruling house).
    LineageId
}

define_key! {
    /// Handle for an enterprise.
    EnterpriseId
}

define_key! {
    /// Handle for a school or university.
    InstitutionId
}

define_key! {
    /// Handle for a recorded calamity.
    CalamityId
}

define_key! {
    /// Handle for a conflict between two polities.
    ConflictId
}

/// Position of an occupation in the occupation catalog.
///
/// Catalog order doubles as the assignment tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OccupationId(pub u32);

impl OccupationId {
    /// Catalog index as a `usize` for slice access.
    pub const fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for OccupationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a simulation run (one per start or restart).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new run identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn keys_display_their_slot_index() {
        let mut arena: SlotMap<PersonId, &str> = SlotMap::with_key();
        let first = arena.insert("first");
        let second = arena.insert("second");
        assert_eq!(second.index(), first.index() + 1);
        assert_eq!(second.to_string(), second.index().to_string());
    }

    #[test]
    fn key_order_follows_insertion() {
        let mut arena: SlotMap<PersonId, u8> = SlotMap::with_key();
        let ids: Vec<PersonId> = (0..5).map(|n| arena.insert(n)).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn key_roundtrip_serde() {
        let mut arena: SlotMap<SettlementId, u8> = SlotMap::with_key();
        let id = arena.insert(7);
        let json = serde_json::to_string(&id).unwrap_or_default();
        let restored: Result<SettlementId, _> = serde_json::from_str(&json);
        assert_eq!(restored.ok(), Some(id));
    }

    #[test]
    fn run_id_display_matches_uuid() {
        let id = RunId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
