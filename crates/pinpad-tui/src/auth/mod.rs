//! Host collaborators for the overlay

mod biometric;
mod hasher;
mod store;

pub use biometric::{BiometricConfig, SimulatedAuthenticator, SimulatedOutcome};
pub use hasher::{HashAlgorithm, Sha256Hasher};
pub use store::FilePinStore;

use std::io::{self, Write};
use std::sync::Arc;

use pinpad_core::{Collaborators, Haptics, HapticsError, LocalAuthenticator, NoHaptics};

use crate::app::TuiConfig;

/// Rings the terminal bell in place of a vibration motor
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn pulse(&self) -> Result<(), HapticsError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|()| stdout.flush())
            .map_err(|e| HapticsError::Device(e.to_string()))
    }
}

/// Assemble the collaborators a config asks for
pub fn collaborators(config: &TuiConfig) -> Collaborators {
    let haptics: Arc<dyn Haptics> = if config.bell {
        Arc::new(TerminalBell)
    } else {
        Arc::new(NoHaptics)
    };
    let authenticator = config.biometric.enabled.then(|| {
        Arc::new(SimulatedAuthenticator::new(&config.biometric)) as Arc<dyn LocalAuthenticator>
    });

    Collaborators {
        hasher: config.hash.hasher(),
        haptics,
        authenticator,
    }
}
