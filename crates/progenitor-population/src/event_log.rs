//! Bounded, sequenced log of domain events.
//!
//! The log keeps only the most recent events. Sequence numbers are
//! assigned on append and keep increasing after old events are evicted,
//! so consumers can detect gaps.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use progenitor_types::{DomainEvent, EventCategory, PersonId, Tick};

/// Default number of retained events.
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Ring buffer of the most recent [`DomainEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    capacity: usize,
    next_sequence: u64,
    events: VecDeque<DomainEvent>,
}

impl EventLog {
    /// Create an empty log holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_sequence: 0,
            events: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an event, evicting the oldest when full. Returns its sequence.
    pub fn push(
        &mut self,
        tick: Tick,
        category: EventCategory,
        description: String,
        subjects: Vec<PersonId>,
    ) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(DomainEvent {
            sequence,
            tick,
            category,
            description,
            subjects,
        });
        sequence
    }

    /// The last `n` events, oldest first.
    pub fn tail(&self, n: usize) -> Vec<DomainEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Iterate retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DomainEvent> {
        self.events.iter()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total events ever appended.
    pub const fn total_appended(&self) -> u64 {
        self.next_sequence
    }

    /// Maximum retained events.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_and_keeps_sequence() {
        let mut log = EventLog::with_capacity(3);
        for tick in 0..5 {
            log.push(tick, EventCategory::Birth, format!("birth {tick}"), Vec::new());
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total_appended(), 5);
        let sequences: Vec<u64> = log.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);
    }

    #[test]
    fn tail_returns_most_recent_in_order() {
        let mut log = EventLog::default();
        for tick in 0..10 {
            log.push(tick, EventCategory::Death, String::new(), Vec::new());
        }
        let tail = log.tail(3);
        let ticks: Vec<Tick> = tail.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![7, 8, 9]);
        assert_eq!(log.tail(50).len(), 10);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut log = EventLog::with_capacity(0);
        log.push(0, EventCategory::Simulation, String::new(), Vec::new());
        log.push(1, EventCategory::Simulation, String::new(), Vec::new());
        assert_eq!(log.len(), 1);
        assert_eq!(log.capacity(), 1);
    }
}
