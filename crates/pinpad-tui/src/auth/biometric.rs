//! Simulated biometric sensor
//!
//! Terminals have no fingerprint reader. The simulator answers after a
//! configurable delay with a fixed outcome so the fallback path can be
//! exercised end to end.

use std::time::Duration;

use async_trait::async_trait;
use clap::ValueEnum;
use pinpad_core::{BiometricError, LocalAuthenticator};
use serde::{Deserialize, Serialize};

/// What the simulated sensor reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SimulatedOutcome {
    /// User recognized
    #[default]
    Accept,
    /// User not recognized
    Decline,
    /// User dismissed the prompt
    Cancel,
    /// No sensor present
    Unavailable,
    /// Sensor present, nothing enrolled
    NotEnrolled,
}

/// Biometric simulator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BiometricConfig {
    /// Offer the simulator to the overlay at all
    pub enabled: bool,
    /// Prompt latency in milliseconds
    pub delay_ms: u64,
    pub outcome: SimulatedOutcome,
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 1_500,
            outcome: SimulatedOutcome::Accept,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedAuthenticator {
    delay: Duration,
    outcome: SimulatedOutcome,
}

impl SimulatedAuthenticator {
    pub fn new(config: &BiometricConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            outcome: config.outcome,
        }
    }
}

#[async_trait]
impl LocalAuthenticator for SimulatedAuthenticator {
    async fn is_available(&self) -> Result<(), BiometricError> {
        match self.outcome {
            SimulatedOutcome::Unavailable => Err(BiometricError::Unavailable),
            SimulatedOutcome::NotEnrolled => Err(BiometricError::NotEnrolled),
            _ => Ok(()),
        }
    }

    async fn authenticate(&self) -> Result<bool, BiometricError> {
        tracing::debug!(outcome = ?self.outcome, "simulated biometric prompt");
        tokio::time::sleep(self.delay).await;
        match self.outcome {
            SimulatedOutcome::Accept => Ok(true),
            SimulatedOutcome::Decline => Ok(false),
            SimulatedOutcome::Cancel => Err(BiometricError::Cancelled),
            SimulatedOutcome::Unavailable => Err(BiometricError::Unavailable),
            SimulatedOutcome::NotEnrolled => Err(BiometricError::NotEnrolled),
        }
    }
}
