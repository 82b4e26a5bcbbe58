//! Host-facing callbacks and external collaborators
//!
//! The core never talks to storage, sensors or vibration motors directly.
//! Hosts supply them through these traits.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::error::{BiometricError, HapticsError, StoreError};
use crate::overlay::{Mode, Status};

/// Callbacks the overlay reports into.
///
/// Only `on_enter` is required; everything else defaults to a no-op.
pub trait PinHost {
    /// A complete entry matched the reference PIN
    fn on_enter(&mut self, pin: &str);

    /// Attempts exhausted with lockout enabled
    fn on_max_attempt(&mut self) {}

    /// The user asked to reset a forgotten PIN
    fn on_reset(&mut self) {}

    fn on_local_auth_success(&mut self) {}

    /// `None` when the authenticator declined without an error
    fn on_local_auth_error(&mut self, _error: Option<&BiometricError>) {}

    /// A new PIN was confirmed and stored
    fn on_set_success(&mut self, _pin: &str) {}

    fn on_set_cancel(&mut self) {}

    /// The stored PIN was removed
    fn on_reset_success(&mut self) {}

    fn on_mode_changed(&mut self, _mode: Mode) {}

    fn on_status_changed(&mut self, _mode: Mode, _status: Status) {}
}

/// Transform applied to a raw entry before comparison.
///
/// An empty result means "compare the raw entry".
pub trait PinHasher: Send + Sync {
    fn hash(&self, raw: &str) -> String;
}

impl<F> PinHasher for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn hash(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Compares entries as typed
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher;

impl PinHasher for IdentityHasher {
    fn hash(&self, raw: &str) -> String {
        raw.to_owned()
    }
}

/// Hash `raw` once, falling back to the raw entry on an empty result
pub fn comparable(hasher: &dyn PinHasher, raw: &str) -> Zeroizing<String> {
    let hashed = Zeroizing::new(hasher.hash(raw));
    if hashed.is_empty() {
        Zeroizing::new(raw.to_owned())
    } else {
        hashed
    }
}

/// Best-effort haptic feedback on a wrong entry
pub trait Haptics: Send + Sync {
    fn pulse(&self) -> Result<(), HapticsError>;
}

/// No vibration available
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&self) -> Result<(), HapticsError> {
        Ok(())
    }
}

/// Platform biometric capability
#[async_trait]
pub trait LocalAuthenticator: Send + Sync {
    /// Check hardware presence and enrollment
    async fn is_available(&self) -> Result<(), BiometricError> {
        Ok(())
    }

    /// Prompt the user; `Ok(false)` when they were not recognized
    async fn authenticate(&self) -> Result<bool, BiometricError>;
}

/// Opaque key-value storage for the reference PIN
pub trait PinStore: Send {
    fn get(&self) -> Result<Option<String>, StoreError>;

    fn set(&mut self, pin: &str) -> Result<(), StoreError>;

    fn delete(&mut self) -> Result<(), StoreError>;
}

/// In-memory PIN store
#[derive(Default)]
pub struct MemoryPinStore {
    pin: Option<Zeroizing<String>>,
}

impl MemoryPinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pin(pin: impl Into<String>) -> Self {
        Self {
            pin: Some(Zeroizing::new(pin.into())),
        }
    }
}

impl fmt::Debug for MemoryPinStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPinStore")
            .field("has_pin", &self.pin.is_some())
            .finish()
    }
}

impl PinStore for MemoryPinStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.pin.as_ref().map(|p| p.as_str().to_owned()))
    }

    fn set(&mut self, pin: &str) -> Result<(), StoreError> {
        self.pin = Some(Zeroizing::new(pin.to_owned()));
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        self.pin = None;
        Ok(())
    }
}

/// Collaborators shared by every session mounted from one overlay
#[derive(Clone)]
pub struct Collaborators {
    pub hasher: Arc<dyn PinHasher>,
    pub haptics: Arc<dyn Haptics>,
    pub authenticator: Option<Arc<dyn LocalAuthenticator>>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            hasher: Arc::new(IdentityHasher),
            haptics: Arc::new(NoHaptics),
            authenticator: None,
        }
    }
}

impl Collaborators {
    pub fn with_hasher(mut self, hasher: impl PinHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.haptics = Arc::new(haptics);
        self
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn LocalAuthenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("authenticator", &self.authenticator.is_some())
            .finish_non_exhaustive()
    }
}
