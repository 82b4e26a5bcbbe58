//! Error types for the PIN overlay core

use thiserror::Error;

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, PinpadError>;

/// Errors that can surface from the overlay to the host
#[derive(Debug, Error)]
pub enum PinpadError {
    /// Options failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reference PIN storage failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Inconsistent configuration, reported before any session starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("PIN length must be between 1 and {max} digits (got {got})")]
    InvalidPinLength { got: usize, max: usize },

    #[error("Maximum attempts must be at least 1")]
    InvalidMaxAttempt,

    #[error("Locked duration must be non-zero when lockout is enabled")]
    InvalidLockedDuration,
}

/// Biometric capability failures. Never counted against the PIN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiometricError {
    #[error("Biometric hardware unavailable")]
    Unavailable,

    #[error("No biometric credential enrolled")]
    NotEnrolled,

    #[error("Biometric prompt cancelled")]
    Cancelled,

    #[error("Biometric authentication failed: {0}")]
    Failed(String),
}

/// Haptic pulse failures (logged, never propagated)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HapticsError {
    #[error("Haptics not supported on this platform")]
    Unsupported,

    #[error("Haptics device error: {0}")]
    Device(String),
}

/// Reference PIN storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt PIN record: {0}")]
    Corrupt(String),
}
