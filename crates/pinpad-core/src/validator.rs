//! Entry validation and lockout
//!
//! The controller tracks consecutive failures for one Enter session:
//!
//! - match: failures reset, input re-armed
//! - mismatch with attempts left: input disabled for the retry window,
//!   then re-armed automatically
//! - mismatch on the last allowed attempt: `Locked`, no re-arm until the
//!   host resets the session
//!
//! The exhaustion check compares the count *before* incrementing against
//! `max_attempt - 1`, so `max_attempt = n` allows exactly n wrong entries.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PinOptions;

/// Entry controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryState {
    /// Not mounted, or reset by the host
    #[default]
    Idle,
    /// Accepting keypad input
    Awaiting,
    /// Comparing a complete entry
    Checking,
    /// Cooling down after a wrong entry
    Disabled,
    /// Attempts exhausted; waits for an external reset
    Locked,
}

/// Timed input lockout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockoutWindow {
    active: bool,
    expires_at: Option<Instant>,
}

impl LockoutWindow {
    fn open(now: Instant, duration: Duration) -> Self {
        Self {
            active: true,
            expires_at: Some(now + duration),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at.filter(|_| self.active)
    }

    /// Deactivate once `now >= expires_at`; true only on the transition
    fn expire(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) if self.active && now >= at => {
                self.active = false;
                true
            }
            _ => false,
        }
    }

    /// Time left in the window
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at().map(|at| at.saturating_duration_since(now))
    }
}

/// Outcome of checking one complete entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected { failures: u32, retry_at: Instant },
    Exhausted { failures: u32 },
}

/// What a tick changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub rearmed: bool,
    pub error_cleared: bool,
}

/// Failure counting and timed lockout for one Enter session
#[derive(Debug, Clone)]
pub struct EntryController {
    state: EntryState,
    failures: u32,
    max_attempt: u32,
    disable_lock: bool,
    retry_lock: Duration,
    error_display: Duration,
    lockout: LockoutWindow,
    error_until: Option<Instant>,
}

impl EntryController {
    pub fn new(options: &PinOptions) -> Self {
        Self {
            state: EntryState::Idle,
            failures: 0,
            max_attempt: options.max_attempt,
            disable_lock: options.disable_lock,
            retry_lock: options.retry_lock(),
            error_display: options.error_display(),
            lockout: LockoutWindow::default(),
            error_until: None,
        }
    }

    /// Idle -> Awaiting with a fresh failure count
    pub fn arm(&mut self) {
        if self.state == EntryState::Idle {
            self.failures = 0;
            self.state = EntryState::Awaiting;
            debug!("entry armed");
        }
    }

    /// Awaiting -> Checking; false if input is not being accepted
    pub fn begin_check(&mut self) -> bool {
        if self.state != EntryState::Awaiting {
            return false;
        }
        self.state = EntryState::Checking;
        true
    }

    /// Resolve a check started with `begin_check`
    pub fn resolve(&mut self, matched: bool, now: Instant) -> Verdict {
        debug_assert_eq!(self.state, EntryState::Checking);

        if matched {
            self.failures = 0;
            self.error_until = None;
            self.state = EntryState::Awaiting;
            return Verdict::Accepted;
        }

        if !self.disable_lock && self.failures >= self.max_attempt.saturating_sub(1) {
            self.failures = (self.failures + 1).min(self.max_attempt);
            self.state = EntryState::Locked;
            debug!(failures = self.failures, "attempts exhausted");
            return Verdict::Exhausted {
                failures: self.failures,
            };
        }

        self.failures = (self.failures + 1).min(self.max_attempt);
        self.lockout = LockoutWindow::open(now, self.retry_lock);
        self.error_until = Some(now + self.error_display);
        self.state = EntryState::Disabled;
        debug!(
            failures = self.failures,
            retry_ms = self.retry_lock.as_millis() as u64,
            "wrong entry, input disabled"
        );

        // A zero-length window expires immediately
        self.tick(now);

        Verdict::Rejected {
            failures: self.failures,
            retry_at: now + self.retry_lock,
        }
    }

    /// Expire the retry window and error flag
    pub fn tick(&mut self, now: Instant) -> Tick {
        let mut tick = Tick::default();

        if self.lockout.expire(now) && self.state == EntryState::Disabled {
            self.state = EntryState::Awaiting;
            tick.rearmed = true;
            debug!("retry window elapsed, input re-armed");
        }

        if matches!(self.error_until, Some(at) if now >= at) {
            self.error_until = None;
            tick.error_cleared = true;
        }

        tick
    }

    /// Any state -> Idle, counters and timers dropped
    pub fn reset(&mut self) {
        self.state = EntryState::Idle;
        self.failures = 0;
        self.lockout = LockoutWindow::default();
        self.error_until = None;
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    /// Wrong entries left before lockout, `None` when lockout is disabled
    pub fn attempts_remaining(&self) -> Option<u32> {
        (!self.disable_lock).then(|| self.max_attempt.saturating_sub(self.failures))
    }

    pub fn lockout(&self) -> &LockoutWindow {
        &self.lockout
    }

    pub fn is_error_visible(&self) -> bool {
        self.error_until.is_some()
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.lockout.expires_at(), self.error_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
