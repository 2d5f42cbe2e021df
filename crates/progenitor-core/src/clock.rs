//! World clock and calendar for the Progenitor simulation.
//!
//! The clock is the single source of truth for simulated time. It holds
//! the current tick (one tick is one day); the year, the day of the year,
//! and whether today closes a year are derived from it and never stored
//! separately.
//!
//! The tick counter advances with checked arithmetic and never goes
//! backwards. Restoring a save builds a clock at the saved tick through
//! [`WorldClock::at`].

use progenitor_types::{DAYS_PER_YEAR, Tick};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond i64::MAX")]
    TickOverflow,

    /// A clock cannot start before the first day of the simulation.
    #[error("invalid tick {tick}: the simulation starts at tick 0")]
    NegativeTick {
        /// The rejected tick.
        tick: Tick,
    },
}

/// Day counter of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldClock {
    tick: Tick,
}

impl WorldClock {
    /// A clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// A clock at an explicit tick, for restoring saved runs.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::NegativeTick`] if `tick` is negative.
    pub const fn at(tick: Tick) -> Result<Self, ClockError> {
        if tick < 0 {
            return Err(ClockError::NegativeTick { tick });
        }
        Ok(Self { tick })
    }

    /// Advance by one day. Returns the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter would exceed
    /// `i64::MAX`.
    pub fn advance(&mut self) -> Result<Tick, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// The current tick.
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Whole years elapsed since tick 0.
    pub const fn year(&self) -> Tick {
        self.tick / DAYS_PER_YEAR
    }

    /// Zero-based day within the current year.
    pub const fn day_of_year(&self) -> Tick {
        self.tick % DAYS_PER_YEAR
    }

    /// Whether the current tick is the last day of a year, the day the
    /// yearly events run.
    pub const fn is_year_end(&self) -> bool {
        is_year_end(self.tick)
    }
}

/// Whether `tick` is the last day of a year.
pub const fn is_year_end(tick: Tick) -> bool {
    tick >= 0 && (tick + 1) % DAYS_PER_YEAR == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = WorldClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.year(), 0);
        assert_eq!(clock.day_of_year(), 0);
    }

    #[test]
    fn advance_increments() {
        let mut clock = WorldClock::new();
        assert_eq!(clock.advance(), Ok(1));
        assert_eq!(clock.advance(), Ok(2));
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn year_end_is_last_day() {
        assert!(!is_year_end(0));
        assert!(!is_year_end(363));
        assert!(is_year_end(364));
        assert!(!is_year_end(365));
        assert!(is_year_end(729));
        assert!(!is_year_end(-1));
    }

    #[test]
    fn calendar_derivation() {
        let clock = WorldClock::at(365 * 3 + 10).unwrap_or_default();
        assert_eq!(clock.year(), 3);
        assert_eq!(clock.day_of_year(), 10);
        assert!(!clock.is_year_end());
    }

    #[test]
    fn negative_start_rejected() {
        assert_eq!(WorldClock::at(-5), Err(ClockError::NegativeTick { tick: -5 }));
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = WorldClock::at(i64::MAX).unwrap_or_default();
        assert_eq!(clock.advance(), Err(ClockError::TickOverflow));
        assert_eq!(clock.tick(), i64::MAX);
    }
}
