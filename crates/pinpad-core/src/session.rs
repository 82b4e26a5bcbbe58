//! One mounted Enter session
//!
//! Binds the keypad layout, digit accumulator, entry controller, biometric
//! coordinator and input gate. The layout is generated once at mount and
//! never recomputed, so a shuffled keypad stays put while the user types.
//!
//! Time is passed in by the host. Hosts call `tick` (or sleep until
//! `next_deadline`) to let the retry window and error flag expire.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::accumulator::{Append, DigitAccumulator};
use crate::biometric::{
    AttemptTicket, BiometricAttemptState, BiometricCoordinator, Eligibility,
    LocalAuthResolution, PendingLocalAuth,
};
use crate::config::PinOptions;
use crate::error::ConfigError;
use crate::gate::{Hold, InputGate};
use crate::host::{comparable, Collaborators, PinHost};
use crate::keypad::{generate_layout, KeyToken, KeypadLayout};
use crate::validator::{EntryController, EntryState, LockoutWindow, Tick, Verdict};

/// Result of a keypad press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Input rejected (disabled, locked, or no effect)
    Ignored,
    /// Sequence changed; `entered` digits so far
    Updated { entered: usize },
    /// Entry matched; `on_enter` fired
    Accepted,
    /// Entry did not match; input cooling down
    Rejected {
        failures: u32,
        attempts_remaining: Option<u32>,
    },
    /// Last allowed attempt failed; `on_max_attempt` fired
    MaxAttempt { failures: u32 },
}

/// Result of a biometric attempt that was still current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAuthOutcome {
    Succeeded,
    Failed,
}

pub struct EntrySession {
    options: PinOptions,
    reference: Option<Zeroizing<String>>,
    collaborators: Collaborators,
    layout: KeypadLayout,
    accumulator: DigitAccumulator,
    controller: EntryController,
    biometric: BiometricCoordinator,
    gate: InputGate,
}

impl EntrySession {
    /// Validate options and mount a session in `Awaiting`
    pub fn mount<R: Rng + ?Sized>(
        options: PinOptions,
        reference: Option<String>,
        collaborators: Collaborators,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        let layout = generate_layout(options.random_positions, rng);
        let mut controller = EntryController::new(&options);
        controller.arm();

        debug!(
            pin_length = options.pin_length,
            max_attempt = options.max_attempt,
            randomized = options.random_positions,
            "entry session mounted"
        );

        Ok(Self {
            accumulator: DigitAccumulator::new(options.pin_length),
            reference: reference.map(Zeroizing::new),
            options,
            collaborators,
            layout,
            controller,
            biometric: BiometricCoordinator::new(),
            gate: InputGate::new(),
        })
    }

    /// Feed one keypad token
    pub fn press(&mut self, token: KeyToken, now: Instant, host: &mut dyn PinHost) -> PressOutcome {
        self.tick(now);

        if !self.gate.is_open() || self.controller.state() != EntryState::Awaiting {
            debug!(state = ?self.controller.state(), "input ignored");
            return PressOutcome::Ignored;
        }

        match self.accumulator.append(token) {
            Append::Ignored => PressOutcome::Ignored,
            Append::Pending(entered) => PressOutcome::Updated { entered },
            Append::Complete => self.check(now, host),
        }
    }

    fn check(&mut self, now: Instant, host: &mut dyn PinHost) -> PressOutcome {
        self.gate.acquire(Hold::Checking);
        self.controller.begin_check();

        let candidate = comparable(self.collaborators.hasher.as_ref(), self.accumulator.sequence());
        let matched = match &self.reference {
            Some(reference) => reference.as_str() == candidate.as_str(),
            None => {
                warn!("no reference PIN configured; entry cannot match");
                false
            }
        };

        let verdict = self.controller.resolve(matched, now);
        self.accumulator.reset();
        self.sync_gate();
        self.gate.release(Hold::Checking);

        match verdict {
            Verdict::Accepted => {
                info!("PIN accepted");
                host.on_enter(&candidate);
                PressOutcome::Accepted
            }
            Verdict::Rejected { failures, .. } => {
                if let Err(e) = self.collaborators.haptics.pulse() {
                    warn!("haptic pulse failed: {}", e);
                }
                PressOutcome::Rejected {
                    failures,
                    attempts_remaining: self.controller.attempts_remaining(),
                }
            }
            Verdict::Exhausted { failures } => {
                warn!(failures, "maximum PIN attempts reached");
                host.on_max_attempt();
                PressOutcome::MaxAttempt { failures }
            }
        }
    }

    /// Expire pending timers
    pub fn tick(&mut self, now: Instant) -> Tick {
        let tick = self.controller.tick(now);
        self.sync_gate();
        tick
    }

    fn sync_gate(&mut self) {
        if self.controller.state() == EntryState::Disabled {
            self.gate.acquire(Hold::Cooldown);
        } else {
            self.gate.release(Hold::Cooldown);
        }
    }

    fn eligibility(&self) -> Eligibility {
        Eligibility {
            allow_local_auth: self.options.allow_local_auth,
            auto_trigger: self.options.auto_trigger_local_auth,
            has_authenticator: self.collaborators.authenticator.is_some(),
            has_reference_pin: self.reference.is_some(),
            input_open: self.is_input_enabled(),
        }
    }

    fn pending(&mut self, ticket: Option<AttemptTicket>) -> Option<PendingLocalAuth> {
        let ticket = ticket?;
        let authenticator = self.collaborators.authenticator.clone()?;
        self.gate.acquire(Hold::Biometric);
        Some(PendingLocalAuth::new(ticket, authenticator))
    }

    /// Start the once-per-mount automatic biometric attempt
    pub fn maybe_auto_trigger(&mut self) -> Option<PendingLocalAuth> {
        let eligibility = self.eligibility();
        let ticket = self.biometric.maybe_auto_trigger(&eligibility);
        self.pending(ticket)
    }

    /// Start a user-requested biometric attempt
    pub fn trigger_local_auth(&mut self) -> Option<PendingLocalAuth> {
        let eligibility = self.eligibility();
        let ticket = self.biometric.trigger_manually(&eligibility);
        self.pending(ticket)
    }

    /// Apply a finished biometric attempt; stale results are dropped
    pub fn resolve_local_auth(
        &mut self,
        resolution: LocalAuthResolution,
        host: &mut dyn PinHost,
    ) -> Option<LocalAuthOutcome> {
        self.biometric.resolve(resolution.ticket, &resolution.result)?;
        self.gate.release(Hold::Biometric);

        match resolution.result {
            Ok(true) => {
                info!("local auth succeeded");
                host.on_local_auth_success();
                Some(LocalAuthOutcome::Succeeded)
            }
            Ok(false) => {
                debug!("local auth declined");
                host.on_local_auth_error(None);
                Some(LocalAuthOutcome::Failed)
            }
            Err(e) => {
                debug!("local auth error: {}", e);
                host.on_local_auth_error(Some(&e));
                Some(LocalAuthOutcome::Failed)
            }
        }
    }

    /// Any state -> Idle. Pending timers and biometric results are orphaned.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.accumulator.reset();
        self.biometric.invalidate();
        self.gate.clear();
        debug!("entry session reset");
    }

    /// Idle -> Awaiting
    pub fn arm(&mut self) {
        self.controller.arm();
    }

    pub fn state(&self) -> EntryState {
        self.controller.state()
    }

    pub fn failure_count(&self) -> u32 {
        self.controller.failure_count()
    }

    pub fn attempts_remaining(&self) -> Option<u32> {
        self.controller.attempts_remaining()
    }

    pub fn entered_len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn pin_length(&self) -> usize {
        self.options.pin_length
    }

    pub fn layout(&self) -> &KeypadLayout {
        &self.layout
    }

    pub fn lockout(&self) -> &LockoutWindow {
        self.controller.lockout()
    }

    pub fn is_error_visible(&self) -> bool {
        self.controller.is_error_visible()
    }

    pub fn is_input_enabled(&self) -> bool {
        self.gate.is_open() && self.controller.state() == EntryState::Awaiting
    }

    pub fn biometric_state(&self) -> BiometricAttemptState {
        self.biometric.state()
    }

    /// Whether a "use biometrics" control should be offered
    pub fn offers_local_auth(&self) -> bool {
        self.options.allow_local_auth
            && self.collaborators.authenticator.is_some()
            && self.reference.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }
}
