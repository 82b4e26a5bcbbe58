//! TUI configuration persistence
//!
//! Overlay options, display text overrides and host settings live in one
//! JSON file under the user's config directory.

use std::fs;
use std::path::{Path, PathBuf};

use pinpad_core::{PinOptions, TextOverrides};
use serde::{Deserialize, Serialize};

use crate::auth::{BiometricConfig, HashAlgorithm};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// PIN file name inside the config directory
const PIN_FILE_NAME: &str = "pin.json";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "pinpad";

/// TUI configuration that persists across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuiConfig {
    /// Overlay behavior
    #[serde(default)]
    pub pin: PinOptions,

    /// Display text overrides
    #[serde(default)]
    pub text: TextOverrides,

    /// Where the hashed PIN is stored (defaults to the config directory)
    #[serde(default)]
    pub pin_file: Option<PathBuf>,

    /// How entries are hashed before storage and comparison
    #[serde(default)]
    pub hash: HashAlgorithm,

    /// Simulated biometric sensor
    #[serde(default)]
    pub biometric: BiometricConfig,

    /// Ring the terminal bell on a wrong entry
    #[serde(default = "default_bell")]
    pub bell: bool,

    /// Use the high-contrast palette
    #[serde(default)]
    pub high_contrast: bool,
}

fn default_bell() -> bool {
    true
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            pin: PinOptions::default(),
            text: TextOverrides::default(),
            pin_file: None,
            hash: HashAlgorithm::default(),
            biometric: BiometricConfig::default(),
            bell: default_bell(),
            high_contrast: false,
        }
    }
}

impl TuiConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        // Try XDG_CONFIG_HOME first, then fall back to ~/.config
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Resolved PIN file location
    pub fn pin_file_path(&self) -> PathBuf {
        self.pin_file.clone().unwrap_or_else(|| {
            Self::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(PIN_FILE_NAME)
        })
    }

    /// Load configuration from disk
    ///
    /// Returns default configuration if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = match Self::config_file_path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load an explicitly named file; errors are reported, not defaulted
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_dir = Self::config_dir().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&config_dir.join(CONFIG_FILE_NAME))
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}
