//! # Resilience Layer
//!
//! Session-health state machine plus the stream retry counter and the two
//! watchdogs (buffering stall, memory pressure).
//!
//! ## State machine
//!
//! ```text
//! Idle → Loading → Buffering → Playing
//!                      │           │
//!                      └─ Stalled ─┤ (stall timer fires)
//!                                  ▼
//!                              Erroring → Retrying → Loading
//!                                  │
//!                                  └─ Failed   (retry ceiling reached)
//! ```
//!
//! The retry counter resets to 0 on every successful transition into
//! `Playing` and increments on each stream error; when it reaches the
//! ceiling the session fails terminally and the consumer must re-invoke
//! load explicitly. The memory watchdog operates orthogonally: crossing the
//! high-water mark issues a non-destructive backend reset without touching
//! the health state or the retry counter.
//!
//! This module is a pure state machine: it owns no timers and no backend
//! references. Deadlines are computed from timestamps supplied by the
//! caller (the facade's injected [`Clock`](backend_traits::Clock)), which
//! keeps every transition deterministic under test.

use backend_traits::Command;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Health of the current playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// No stream activity.
    Idle,
    /// A load command has been issued.
    Loading,
    /// The backend is buffering; the stall timer is armed.
    Buffering,
    /// Audio is playing.
    Playing,
    /// Buffering exceeded the stall window without progress.
    Stalled,
    /// A stream error is being classified.
    Erroring,
    /// A retry has been scheduled; the load command is being re-issued.
    Retrying,
    /// The retry ceiling was reached; no further automatic recovery.
    Failed,
}

/// Outcome of classifying a stream error.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Re-issue the given load command with identical parameters.
    Retry(Command),
    /// Ceiling reached (or nothing to retry): surface a terminal error.
    Fail,
}

/// Retry/failover counters and watchdog state for one session.
#[derive(Debug)]
pub struct Resilience {
    health: HealthState,
    attempts: u32,
    ceiling: u32,
    last_load: Option<Command>,
    stall_timeout: Option<Duration>,
    stall_deadline: Option<DateTime<Utc>>,
    memory_high_water: u64,
}

impl Resilience {
    /// Create resilience state with the given limits.
    pub fn new(ceiling: u32, memory_high_water: u64, stall_timeout: Option<Duration>) -> Self {
        Self {
            health: HealthState::Idle,
            attempts: 0,
            ceiling,
            last_load: None,
            stall_timeout,
            stall_deadline: None,
            memory_high_water,
        }
    }

    /// Current health state.
    pub fn health(&self) -> HealthState {
        self.health
    }

    /// Current retry attempt counter.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The last load command, kept for identical-argument retries.
    pub fn last_load(&self) -> Option<&Command> {
        self.last_load.as_ref()
    }

    /// Record that a load command was issued.
    ///
    /// Only load-class commands are retryable; others are ignored.
    pub fn record_load(&mut self, command: Command) {
        if !command.kind().is_load() {
            return;
        }
        self.last_load = Some(command);
        self.health = HealthState::Loading;
        self.stall_deadline = None;
    }

    /// Record buffering/load progress, (re)arming the stall timer.
    pub fn on_progress(&mut self, now: DateTime<Utc>) {
        match self.health {
            HealthState::Loading | HealthState::Buffering | HealthState::Retrying => {
                self.health = HealthState::Buffering;
                self.arm_stall(now);
            }
            _ => {}
        }
    }

    /// Record a successful transition into playing. Resets the retry
    /// counter and disarms the stall timer.
    pub fn on_playing(&mut self) {
        self.health = HealthState::Playing;
        self.attempts = 0;
        self.stall_deadline = None;
    }

    /// Record a stop or natural end of stream.
    pub fn on_stopped(&mut self) {
        self.health = HealthState::Idle;
        self.stall_deadline = None;
    }

    /// Classify a stream error into a retry or a terminal failure.
    ///
    /// The counter increments on every error; when it reaches the ceiling,
    /// or when there is no load command to re-issue, the session fails.
    pub fn on_stream_error(&mut self) -> Disposition {
        self.health = HealthState::Erroring;
        self.attempts = self.attempts.saturating_add(1);

        match self.last_load.clone() {
            Some(command) if self.attempts < self.ceiling => {
                self.health = HealthState::Retrying;
                self.stall_deadline = None;
                Disposition::Retry(command)
            }
            _ => {
                self.health = HealthState::Failed;
                self.stall_deadline = None;
                Disposition::Fail
            }
        }
    }

    /// Check whether the stall window elapsed without progress.
    ///
    /// Fires at most once per arming: on firing the health moves to
    /// `Stalled` and the timer disarms. The caller converts the stall into
    /// a stream error via [`Resilience::on_stream_error`].
    pub fn check_stall(&mut self, now: DateTime<Utc>) -> bool {
        let Some(deadline) = self.stall_deadline else {
            return false;
        };
        if self.health == HealthState::Buffering && now >= deadline {
            self.health = HealthState::Stalled;
            self.stall_deadline = None;
            return true;
        }
        false
    }

    /// Returns `true` if the resource estimate crossed the high-water mark.
    ///
    /// Purely a threshold check: the caller issues the reset command and
    /// neither health state nor retry counter change.
    pub fn memory_exceeded(&self, estimate: Option<u64>) -> bool {
        estimate.is_some_and(|bytes| bytes >= self.memory_high_water)
    }

    /// Set the stall window. If the timer is currently armed it is re-armed
    /// from `now` with the new window.
    pub fn set_stall_timeout(&mut self, timeout: Duration, now: DateTime<Utc>) {
        self.stall_timeout = Some(timeout);
        if self.health == HealthState::Buffering {
            self.arm_stall(now);
        }
    }

    /// Set the memory high-water mark in bytes.
    pub fn set_memory_limit(&mut self, bytes: u64) {
        self.memory_high_water = bytes;
    }

    /// Reset the retry counter without touching the health state.
    /// Invoked by `resume`.
    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
    }

    /// Tear down all resilience state, as part of session cleanup.
    pub fn reset(&mut self) {
        self.health = HealthState::Idle;
        self.attempts = 0;
        self.last_load = None;
        self.stall_deadline = None;
    }

    fn arm_stall(&mut self, now: DateTime<Utc>) {
        self.stall_deadline = self.stall_timeout.map(|timeout| {
            now + chrono::Duration::from_std(timeout).unwrap_or_else(|_| chrono::Duration::MAX)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn load() -> Command {
        Command::LoadUrl("http://host/stream.mp3".into())
    }

    #[test]
    fn happy_path_transitions() {
        let mut r = Resilience::new(5, 1024, Some(Duration::from_secs(10)));
        assert_eq!(r.health(), HealthState::Idle);

        r.record_load(load());
        assert_eq!(r.health(), HealthState::Loading);

        r.on_progress(t(0));
        assert_eq!(r.health(), HealthState::Buffering);

        r.on_playing();
        assert_eq!(r.health(), HealthState::Playing);
        assert_eq!(r.attempts(), 0);
    }

    #[test]
    fn non_load_commands_are_not_recorded() {
        let mut r = Resilience::new(5, 1024, None);
        r.record_load(Command::Pause);
        assert_eq!(r.health(), HealthState::Idle);
        assert!(r.last_load().is_none());
    }

    #[test]
    fn errors_below_ceiling_retry_with_identical_command() {
        let mut r = Resilience::new(5, 1024, None);
        r.record_load(load());

        for attempt in 1..5 {
            match r.on_stream_error() {
                Disposition::Retry(command) => assert_eq!(command, load()),
                Disposition::Fail => panic!("attempt {attempt} should retry"),
            }
            assert_eq!(r.attempts(), attempt);
            assert_eq!(r.health(), HealthState::Retrying);
            r.record_load(load());
        }

        // The ceiling-th consecutive error fails terminally.
        assert_eq!(r.on_stream_error(), Disposition::Fail);
        assert_eq!(r.health(), HealthState::Failed);
    }

    #[test]
    fn playing_resets_the_counter() {
        let mut r = Resilience::new(5, 1024, None);
        r.record_load(load());

        for _ in 0..4 {
            assert!(matches!(r.on_stream_error(), Disposition::Retry(_)));
            r.record_load(load());
        }
        assert_eq!(r.attempts(), 4);

        r.on_playing();
        assert_eq!(r.attempts(), 0);

        // A fresh error after recovery retries again.
        assert!(matches!(r.on_stream_error(), Disposition::Retry(_)));
    }

    #[test]
    fn error_without_prior_load_fails() {
        let mut r = Resilience::new(5, 1024, None);
        assert_eq!(r.on_stream_error(), Disposition::Fail);
        assert_eq!(r.health(), HealthState::Failed);
    }

    #[test]
    fn stall_fires_once_after_window() {
        let mut r = Resilience::new(5, 1024, Some(Duration::from_secs(10)));
        r.record_load(load());
        r.on_progress(t(0));

        assert!(!r.check_stall(t(9)));
        assert!(r.check_stall(t(10)));
        assert_eq!(r.health(), HealthState::Stalled);

        // Disarmed after firing.
        assert!(!r.check_stall(t(20)));
    }

    #[test]
    fn progress_rearms_the_stall_timer() {
        let mut r = Resilience::new(5, 1024, Some(Duration::from_secs(10)));
        r.record_load(load());
        r.on_progress(t(0));
        r.on_progress(t(8));

        assert!(!r.check_stall(t(10)));
        assert!(r.check_stall(t(18)));
    }

    #[test]
    fn no_stall_without_configured_timeout() {
        let mut r = Resilience::new(5, 1024, None);
        r.record_load(load());
        r.on_progress(t(0));
        assert!(!r.check_stall(t(3600)));
    }

    #[test]
    fn playing_disarms_the_stall_timer() {
        let mut r = Resilience::new(5, 1024, Some(Duration::from_secs(10)));
        r.record_load(load());
        r.on_progress(t(0));
        r.on_playing();
        assert!(!r.check_stall(t(60)));
        assert_eq!(r.health(), HealthState::Playing);
    }

    #[test]
    fn setting_stall_timeout_rearms_while_buffering() {
        let mut r = Resilience::new(5, 1024, None);
        r.record_load(load());
        r.on_progress(t(0));
        assert!(!r.check_stall(t(100)));

        r.set_stall_timeout(Duration::from_secs(5), t(100));
        assert!(r.check_stall(t(105)));
    }

    #[test]
    fn memory_threshold_check() {
        let mut r = Resilience::new(5, 1000, None);
        assert!(!r.memory_exceeded(None));
        assert!(!r.memory_exceeded(Some(999)));
        assert!(r.memory_exceeded(Some(1000)));

        r.set_memory_limit(500);
        assert!(r.memory_exceeded(Some(600)));
    }

    #[test]
    fn reset_restores_idle_state() {
        let mut r = Resilience::new(5, 1024, Some(Duration::from_secs(10)));
        r.record_load(load());
        r.on_progress(t(0));
        let _ = r.on_stream_error();

        r.reset();
        assert_eq!(r.health(), HealthState::Idle);
        assert_eq!(r.attempts(), 0);
        assert!(r.last_load().is_none());
        assert!(!r.check_stall(t(1000)));
    }
}
