//! The explicit simulation context threaded through every routine.
//!
//! There is no global random source or counter anywhere in the engine:
//! each call that needs randomness or records an event receives the
//! [`SimContext`] by mutable reference.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use progenitor_types::{EventCategory, PersonId, Tick};

use crate::event_log::EventLog;

/// Random stream plus event log for one simulation run.
#[derive(Debug, Clone)]
pub struct SimContext {
    /// The run's single random stream.
    pub rng: StdRng,
    /// Recent domain events.
    pub events: EventLog,
    seed: u64,
}

impl SimContext {
    /// Create a context seeded with `seed` and an event log of `capacity`.
    pub fn new(seed: u64, capacity: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            events: EventLog::with_capacity(capacity),
            seed,
        }
    }

    /// Rebuild around a restored event log, reseeding the stream from
    /// `seed` mixed with `tick` so a restored run does not replay the
    /// stream from its start.
    pub fn resume(seed: u64, tick: Tick, events: EventLog) -> Self {
        let mixed = seed ^ (tick as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            rng: StdRng::seed_from_u64(mixed),
            events,
            seed,
        }
    }

    /// The seed the run was started with.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Append a domain event and return its sequence number.
    pub fn record(
        &mut self,
        tick: Tick,
        category: EventCategory,
        description: impl Into<String>,
        subjects: Vec<PersonId>,
    ) -> u64 {
        let description = description.into();
        debug!(tick, category = ?category, %description, "event appended");
        self.events.push(tick, category, description, subjects)
    }
}
