//! Pinpad Core - PIN entry state machine for lock-screen overlays
//!
//! This crate provides the pieces behind a PIN-gated overlay: keypad layout
//! generation (optionally shuffled), a bounded digit accumulator, the entry
//! validator with failure counting and timed lockout, and a biometric
//! fallback coordinator. [`PinOverlay`] ties them together with the
//! Enter/Set/Reset/Locked modes.
//!
//! Storage, biometrics, hashing and haptics are supplied by the host through
//! the traits in [`host`]. The core never reads the clock itself; every
//! time-dependent call takes an `Instant`.

pub mod accumulator;
pub mod biometric;
pub mod config;
pub mod error;
pub mod gate;
pub mod host;
pub mod keypad;
pub mod overlay;
pub mod session;
pub mod validator;

pub use accumulator::{Append, DigitAccumulator};
pub use biometric::{
    AttemptTicket, BiometricAttemptState, BiometricCoordinator, LocalAuthResolution,
    PendingLocalAuth,
};
pub use config::{PinOptions, TextOptions, TextOverrides, MAX_PIN_LENGTH};
pub use error::{BiometricError, ConfigError, HapticsError, PinpadError, Result, StoreError};
pub use gate::{Hold, InputGate};
pub use host::{
    Collaborators, Haptics, IdentityHasher, LocalAuthenticator, MemoryPinStore, NoHaptics,
    PinHasher, PinHost, PinStore,
};
pub use keypad::{generate_layout, KeyToken, KeypadLayout};
pub use overlay::{Mode, PinOverlay, SetStep, SetView, Status};
pub use session::{EntrySession, LocalAuthOutcome, PressOutcome};
pub use validator::{EntryController, EntryState, LockoutWindow, Verdict};
