//! Operator control state for runtime simulation management.
//!
//! This module provides shared atomic state used by the driving loop and
//! whatever front end issues commands. The operator can pause and resume,
//! advance a single day while paused, change the speed, request a restart
//! with a new seed, and request a clean stop, all without stopping the
//! process.
//!
//! # Architecture
//!
//! Every control field is an atomic so the loop reads them without locks
//! on the hot path. A single [`Notify`] wakes the loop whenever a command
//! arrives while it is paused.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::RunnerConfig;
use crate::stats::SimulationEndReason;

/// Slowest speed, in ticks per wakeup.
pub const MIN_SPEED: u32 = 1;

/// Fastest speed, in ticks per wakeup.
pub const MAX_SPEED: u32 = 100;

/// Shared operator control state.
///
/// Wrapped in an `Arc` and shared between the driving loop and command
/// handlers.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Wakes the loop when a command arrives.
    wake: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Whether a restart is pending.
    restart_requested: AtomicBool,

    /// Seed for the pending restart.
    restart_seed: AtomicU64,

    /// Single days requested while paused.
    pending_steps: AtomicU64,

    /// Ticks run per wakeup.
    speed: AtomicU32,

    /// Milliseconds between wakeups.
    wakeup_interval_ms: AtomicU64,

    /// Wall-clock time when the operator state was created.
    started_at: DateTime<Utc>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create operator state from the runner configuration.
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            wake: Notify::new(),
            stop_requested: AtomicBool::new(false),
            restart_requested: AtomicBool::new(false),
            restart_seed: AtomicU64::new(0),
            pending_steps: AtomicU64::new(0),
            speed: AtomicU32::new(config.speed.clamp(MIN_SPEED, MAX_SPEED)),
            wakeup_interval_ms: AtomicU64::new(config.wakeup_interval_ms),
            started_at: Utc::now(),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume / Step
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The loop sleeps until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.wake.notify_one();
    }

    /// Ask a paused loop to run exactly one more day.
    pub fn request_step(&self) {
        self.pending_steps.fetch_add(1, Ordering::AcqRel);
        self.wake.notify_one();
    }

    /// Consume one requested day. Returns `false` if none was pending.
    pub fn take_step(&self) -> bool {
        self.pending_steps
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Whether the loop has something to do: it is running, or a step,
    /// restart, or stop is pending.
    pub fn has_work(&self) -> bool {
        !self.is_paused()
            || self.pending_steps.load(Ordering::Acquire) > 0
            || self.restart_requested.load(Ordering::Acquire)
            || self.is_stop_requested()
    }

    /// Wait until [`has_work`](Self::has_work) is true.
    ///
    /// Returns immediately if it already is.
    pub async fn wait_for_work(&self) {
        while !self.has_work() {
            self.wake.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop / Restart
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Ask the loop to discard the run and start over with `seed`.
    pub fn request_restart(&self, seed: u64) {
        self.restart_seed.store(seed, Ordering::Release);
        self.restart_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Consume a pending restart request, returning its seed.
    pub fn take_restart(&self) -> Option<u64> {
        self.restart_requested
            .swap(false, Ordering::AcqRel)
            .then(|| self.restart_seed.load(Ordering::Acquire))
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    /// Ticks run per wakeup.
    pub fn speed(&self) -> u32 {
        self.speed.load(Ordering::Acquire)
    }

    /// Set the ticks run per wakeup.
    ///
    /// Returns the previous speed, or `None` if `speed` is outside
    /// [`MIN_SPEED`]`..=`[`MAX_SPEED`].
    pub fn set_speed(&self, speed: u32) -> Option<u32> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return None;
        }
        Some(self.speed.swap(speed, Ordering::AcqRel))
    }

    /// Milliseconds between wakeups.
    pub fn wakeup_interval_ms(&self) -> u64 {
        self.wakeup_interval_ms.load(Ordering::Acquire)
    }

    /// Set the milliseconds between wakeups. Returns the previous value.
    pub fn set_wakeup_interval_ms(&self, ms: u64) -> u64 {
        self.wakeup_interval_ms.swap(ms, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Wall clock
    // -----------------------------------------------------------------------

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since the operator state was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}

/// JSON-serializable status of the driving loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorStatus {
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
    /// Ticks run per wakeup.
    pub speed: u32,
    /// Milliseconds between wakeups.
    pub wakeup_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// The reason the simulation ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
}

impl OperatorState {
    /// A point-in-time status report.
    pub async fn status(&self) -> OperatorStatus {
        OperatorStatus {
            paused: self.is_paused(),
            stop_requested: self.is_stop_requested(),
            speed: self.speed(),
            wakeup_interval_ms: self.wakeup_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            end_reason: self.end_reason().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn state() -> OperatorState {
        OperatorState::new(&RunnerConfig::default())
    }

    #[test]
    fn initial_state_is_running() {
        let state = state();
        assert!(!state.is_paused());
        assert!(!state.is_stop_requested());
        assert_eq!(state.take_restart(), None);
        assert!(state.has_work());
    }

    #[test]
    fn pause_and_resume() {
        let state = state();
        state.pause();
        assert!(state.is_paused());
        assert!(!state.has_work());
        state.resume();
        assert!(!state.is_paused());
    }

    #[test]
    fn speed_is_bounded() {
        let state = state();
        assert_eq!(state.set_speed(50), Some(1));
        assert_eq!(state.speed(), 50);
        assert_eq!(state.set_speed(0), None);
        assert_eq!(state.set_speed(101), None);
        assert_eq!(state.speed(), 50);
    }

    #[test]
    fn configured_speed_is_clamped() {
        let config = RunnerConfig {
            speed: 1000,
            ..RunnerConfig::default()
        };
        assert_eq!(OperatorState::new(&config).speed(), MAX_SPEED);
    }

    #[test]
    fn steps_are_counted() {
        let state = state();
        state.pause();
        state.request_step();
        state.request_step();
        assert!(state.has_work());
        assert!(state.take_step());
        assert!(state.take_step());
        assert!(!state.take_step());
        assert!(!state.has_work());
    }

    #[test]
    fn restart_is_taken_once() {
        let state = state();
        state.request_restart(77);
        assert_eq!(state.take_restart(), Some(77));
        assert_eq!(state.take_restart(), None);
    }

    #[tokio::test]
    async fn resume_wakes_a_waiting_loop() {
        let state = Arc::new(state());
        state.pause();
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.wait_for_work().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        state.resume();
        let woke = tokio::time::timeout(Duration::from_secs(2), waiter).await;
        assert!(matches!(woke, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn end_reason_round_trip() {
        let state = state();
        assert_eq!(state.end_reason().await, None);
        state.set_end_reason(SimulationEndReason::OperatorStop).await;
        assert_eq!(state.status().await.end_reason, Some(SimulationEndReason::OperatorStop));
    }
}
