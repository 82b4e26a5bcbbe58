//! Command-line flags

use std::path::PathBuf;

use clap::Parser;

use crate::app::TuiConfig;
use crate::auth::SimulatedOutcome;

#[derive(Parser, Debug)]
#[command(name = "pinpad")]
#[command(about = "PIN lock screen for the terminal")]
pub struct Args {
    /// Config file (defaults to ~/.config/pinpad/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where the hashed PIN is stored
    #[arg(long)]
    pub pin_file: Option<PathBuf>,

    /// Number of digits in a PIN
    #[arg(long)]
    pub pin_length: Option<usize>,

    /// Wrong entries allowed before locking
    #[arg(long)]
    pub max_attempt: Option<u32>,

    /// Shuffle keypad digits
    #[arg(long)]
    pub shuffle: bool,

    /// Never lock; wrong entries only cool down
    #[arg(long)]
    pub no_lock: bool,

    /// Enable the simulated biometric sensor with this outcome
    #[arg(long, value_enum)]
    pub biometric: Option<SimulatedOutcome>,

    /// Start the biometric prompt as soon as the keypad appears
    #[arg(long, requires = "biometric")]
    pub auto_biometric: bool,

    /// Log file
    #[arg(long, default_value = "pinpad.log")]
    pub log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Overlay flags onto a loaded config
    pub fn apply(&self, config: &mut TuiConfig) {
        if let Some(path) = &self.pin_file {
            config.pin_file = Some(path.clone());
        }
        if let Some(length) = self.pin_length {
            config.pin.pin_length = length;
        }
        if let Some(max) = self.max_attempt {
            config.pin.max_attempt = max;
        }
        if self.shuffle {
            config.pin.random_positions = true;
        }
        if self.no_lock {
            config.pin.disable_lock = true;
        }
        if let Some(outcome) = self.biometric {
            config.biometric.enabled = true;
            config.biometric.outcome = outcome;
            config.pin.allow_local_auth = true;
        }
        if self.auto_biometric {
            config.pin.auto_trigger_local_auth = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "pinpad",
            "--pin-length",
            "6",
            "--shuffle",
            "--biometric",
            "decline",
            "--auto-biometric",
        ]);
        let mut config = TuiConfig::default();
        config.pin.max_attempt = 9;
        args.apply(&mut config);

        assert_eq!(config.pin.pin_length, 6);
        assert_eq!(config.pin.max_attempt, 9);
        assert!(config.pin.random_positions);
        assert!(config.pin.allow_local_auth);
        assert!(config.pin.auto_trigger_local_auth);
        assert!(config.biometric.enabled);
        assert_eq!(config.biometric.outcome, SimulatedOutcome::Decline);
    }

    #[test]
    fn test_no_flags_leave_config_alone() {
        let args = Args::parse_from(["pinpad"]);
        let mut config = TuiConfig::default();
        args.apply(&mut config);

        assert_eq!(config.pin, TuiConfig::default().pin);
        assert!(!config.biometric.enabled);
    }

    #[test]
    fn test_auto_biometric_needs_sensor() {
        assert!(Args::try_parse_from(["pinpad", "--auto-biometric"]).is_err());
    }
}
