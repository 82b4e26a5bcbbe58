//! Biometric fallback coordination
//!
//! Biometric authentication runs beside manual entry. At most one attempt is
//! in flight; the automatic trigger fires once per mount. Every attempt gets
//! a ticket stamped with the coordinator's epoch, and a resolution carrying
//! a ticket from an earlier epoch (the session was reset or unmounted) is
//! dropped.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::BiometricError;
use crate::host::LocalAuthenticator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiometricAttemptState {
    #[default]
    NotStarted,
    InFlight,
    Succeeded,
    Failed,
}

/// Identifies one biometric attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTicket {
    epoch: u64,
    attempt: u64,
}

/// Conditions gating a biometric attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct Eligibility {
    pub allow_local_auth: bool,
    pub auto_trigger: bool,
    pub has_authenticator: bool,
    pub has_reference_pin: bool,
    pub input_open: bool,
}

impl Eligibility {
    fn manual(&self) -> bool {
        self.allow_local_auth && self.has_authenticator && self.has_reference_pin
    }

    fn auto(&self) -> bool {
        self.manual() && self.auto_trigger
    }
}

#[derive(Debug, Default)]
pub struct BiometricCoordinator {
    state: BiometricAttemptState,
    auto_latched: bool,
    epoch: u64,
    attempts: u64,
    in_flight: Option<AttemptTicket>,
}

impl BiometricCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the automatic attempt, at most once for this coordinator
    pub fn maybe_auto_trigger(&mut self, eligibility: &Eligibility) -> Option<AttemptTicket> {
        if !eligibility.auto() || self.auto_latched {
            return None;
        }
        // Latch before starting so a slow attempt can't be doubled
        self.auto_latched = true;
        debug!("auto-triggering local auth");
        self.start()
    }

    /// Start a user-requested attempt; independent of the auto latch
    pub fn trigger_manually(&mut self, eligibility: &Eligibility) -> Option<AttemptTicket> {
        if !eligibility.manual() || !eligibility.input_open {
            return None;
        }
        self.start()
    }

    fn start(&mut self) -> Option<AttemptTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        self.attempts += 1;
        let ticket = AttemptTicket {
            epoch: self.epoch,
            attempt: self.attempts,
        };
        self.in_flight = Some(ticket);
        self.state = BiometricAttemptState::InFlight;
        Some(ticket)
    }

    /// Record a resolution; `None` if the ticket is stale
    pub fn resolve(
        &mut self,
        ticket: AttemptTicket,
        result: &Result<bool, BiometricError>,
    ) -> Option<BiometricAttemptState> {
        if self.in_flight != Some(ticket) {
            debug!(?ticket, "dropping stale local auth result");
            return None;
        }
        self.in_flight = None;
        self.state = match result {
            Ok(true) => BiometricAttemptState::Succeeded,
            Ok(false) | Err(_) => BiometricAttemptState::Failed,
        };
        Some(self.state)
    }

    /// Orphan any in-flight attempt. The auto latch survives.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        self.state = BiometricAttemptState::NotStarted;
    }

    pub fn state(&self) -> BiometricAttemptState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn auto_latched(&self) -> bool {
        self.auto_latched
    }
}

/// A started attempt, ready to be awaited by the host's executor
pub struct PendingLocalAuth {
    ticket: AttemptTicket,
    authenticator: Arc<dyn LocalAuthenticator>,
}

impl PendingLocalAuth {
    pub(crate) fn new(ticket: AttemptTicket, authenticator: Arc<dyn LocalAuthenticator>) -> Self {
        Self {
            ticket,
            authenticator,
        }
    }

    pub fn ticket(&self) -> AttemptTicket {
        self.ticket
    }

    /// Check availability, then prompt
    pub async fn run(self) -> LocalAuthResolution {
        let result = match self.authenticator.is_available().await {
            Ok(()) => self.authenticator.authenticate().await,
            Err(e) => Err(e),
        };
        LocalAuthResolution {
            ticket: self.ticket,
            result,
        }
    }
}

impl fmt::Debug for PendingLocalAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLocalAuth")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Result of a finished attempt, fed back to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAuthResolution {
    pub ticket: AttemptTicket,
    pub result: Result<bool, BiometricError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible() -> Eligibility {
        Eligibility {
            allow_local_auth: true,
            auto_trigger: true,
            has_authenticator: true,
            has_reference_pin: true,
            input_open: true,
        }
    }

    #[test]
    fn test_auto_trigger_once() {
        let mut coordinator = BiometricCoordinator::new();
        let ticket = coordinator.maybe_auto_trigger(&eligible()).unwrap();
        assert_eq!(coordinator.state(), BiometricAttemptState::InFlight);
        assert!(coordinator.maybe_auto_trigger(&eligible()).is_none());

        coordinator.resolve(ticket, &Ok(false));
        assert!(coordinator.maybe_auto_trigger(&eligible()).is_none());
    }

    #[test]
    fn test_auto_requires_reference_pin() {
        let mut coordinator = BiometricCoordinator::new();
        let eligibility = Eligibility {
            has_reference_pin: false,
            ..eligible()
        };
        assert!(coordinator.maybe_auto_trigger(&eligibility).is_none());
        assert!(!coordinator.auto_latched());
    }

    #[test]
    fn test_manual_ignores_latch_but_not_gate() {
        let mut coordinator = BiometricCoordinator::new();
        let auto = coordinator.maybe_auto_trigger(&eligible()).unwrap();
        coordinator.resolve(auto, &Err(BiometricError::Cancelled));
        assert_eq!(coordinator.state(), BiometricAttemptState::Failed);

        let closed = Eligibility {
            input_open: false,
            ..eligible()
        };
        assert!(coordinator.trigger_manually(&closed).is_none());

        let manual = coordinator.trigger_manually(&eligible()).unwrap();
        assert_eq!(
            coordinator.resolve(manual, &Ok(true)),
            Some(BiometricAttemptState::Succeeded)
        );
    }

    #[test]
    fn test_single_attempt_in_flight() {
        let mut coordinator = BiometricCoordinator::new();
        coordinator.trigger_manually(&eligible()).unwrap();
        assert!(coordinator.trigger_manually(&eligible()).is_none());
    }

    #[test]
    fn test_stale_ticket_dropped() {
        let mut coordinator = BiometricCoordinator::new();
        let ticket = coordinator.trigger_manually(&eligible()).unwrap();
        coordinator.invalidate();

        assert_eq!(coordinator.resolve(ticket, &Ok(true)), None);
        assert_eq!(coordinator.state(), BiometricAttemptState::NotStarted);

        let fresh = coordinator.trigger_manually(&eligible()).unwrap();
        assert_ne!(fresh, ticket);
    }
}
