//! Overlay configuration
//!
//! Every option carries a stated default. Options are validated and resolved
//! once when a session is mounted; nothing reads them ad hoc afterwards.
//! Display strings follow the same rule: an immutable default table is merged
//! with host overrides into a fresh value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default PIN length
pub const DEFAULT_PIN_LENGTH: usize = 4;
/// Longest PIN the keypad accepts
pub const MAX_PIN_LENGTH: usize = 12;
/// Default number of wrong entries allowed before lockout
pub const DEFAULT_MAX_ATTEMPT: u32 = 4;
/// Default input cooldown after a wrong entry
pub const DEFAULT_RETRY_LOCK_MS: u64 = 2_000;
/// Default Locked mode duration (10 minutes)
pub const DEFAULT_LOCKED_MS: u64 = 600_000;

/// Behavioral options for the overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PinOptions {
    /// Number of digits in a PIN
    pub pin_length: usize,
    /// Wrong entries allowed before `on_max_attempt` fires
    pub max_attempt: u32,
    /// Input cooldown after a wrong entry, in milliseconds
    pub retry_lock_duration: u64,
    /// How long the "wrong PIN" flag stays up; falls back to `retry_lock_duration`
    pub error_duration: Option<u64>,
    /// Locked mode countdown, in milliseconds
    pub locked_duration: u64,
    /// Never enter Locked mode; wrong entries only cool down
    pub disable_lock: bool,
    /// Offer the "forgot PIN" reset flow
    pub allow_reset: bool,
    /// Offer biometric authentication
    pub allow_local_auth: bool,
    /// Start a biometric attempt automatically on mount
    pub auto_trigger_local_auth: bool,
    /// Shuffle digit positions on the keypad
    pub random_positions: bool,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self {
            pin_length: DEFAULT_PIN_LENGTH,
            max_attempt: DEFAULT_MAX_ATTEMPT,
            retry_lock_duration: DEFAULT_RETRY_LOCK_MS,
            error_duration: None,
            locked_duration: DEFAULT_LOCKED_MS,
            disable_lock: false,
            allow_reset: true,
            allow_local_auth: false,
            auto_trigger_local_auth: false,
            random_positions: false,
        }
    }
}

impl PinOptions {
    /// Reject inconsistent options before an entry session starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pin_length == 0 || self.pin_length > MAX_PIN_LENGTH {
            return Err(ConfigError::InvalidPinLength {
                got: self.pin_length,
                max: MAX_PIN_LENGTH,
            });
        }
        if self.max_attempt == 0 {
            return Err(ConfigError::InvalidMaxAttempt);
        }
        if !self.disable_lock && self.locked_duration == 0 {
            return Err(ConfigError::InvalidLockedDuration);
        }
        Ok(())
    }

    pub fn retry_lock(&self) -> Duration {
        Duration::from_millis(self.retry_lock_duration)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_duration.unwrap_or(self.retry_lock_duration))
    }

    pub fn locked(&self) -> Duration {
        Duration::from_millis(self.locked_duration)
    }
}

/// Strings for the Enter mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterText {
    pub title: String,
    pub sub_title: String,
    pub error: String,
    pub back_space: String,
    pub local_auth_button: String,
    pub footer_text: String,
}

/// Strings for the Set mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetText {
    pub title: String,
    pub sub_title: String,
    pub repeat: String,
    pub error: String,
    pub cancel: String,
}

/// Strings for the Locked mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedText {
    pub title: String,
    pub sub_title: String,
    pub locked_text: String,
}

/// Strings for the Reset mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetText {
    pub title: String,
    pub sub_title: String,
    pub confirm: String,
    pub back: String,
}

/// Resolved display strings for all modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    pub enter: EnterText,
    pub set: SetText,
    pub locked: LockedText,
    pub reset: ResetText,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            enter: EnterText {
                title: "Enter PIN".into(),
                sub_title: "Enter {{pinLength}}-digit PIN to access.".into(),
                error: "Wrong PIN! Try again.".into(),
                back_space: "Delete".into(),
                local_auth_button: "Use biometrics".into(),
                footer_text: "Forgot PIN?".into(),
            },
            set: SetText {
                title: "Set up a new PIN".into(),
                sub_title: "Enter {{pinLength}} digits.".into(),
                repeat: "Enter new PIN again.".into(),
                error: "PIN don't match. Start the process again.".into(),
                cancel: "Cancel".into(),
            },
            locked: LockedText {
                title: "Locked".into(),
                sub_title: "You have entered wrong PIN many times.\nThe app is temporarily locked."
                    .into(),
                locked_text: "Locked".into(),
            },
            reset: ResetText {
                title: "Forgot PIN?".into(),
                sub_title: "Remove the PIN may wipe out the app data and settings.".into(),
                confirm: "Are you sure you want remove the PIN?".into(),
                back: "Back".into(),
            },
        }
    }
}

/// Partial host overrides; `None` keeps the default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextOverrides {
    pub enter: EnterOverrides,
    pub set: SetOverrides,
    pub locked: LockedOverrides,
    pub reset: ResetOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnterOverrides {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub error: Option<String>,
    pub back_space: Option<String>,
    pub local_auth_button: Option<String>,
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetOverrides {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub repeat: Option<String>,
    pub error: Option<String>,
    pub cancel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LockedOverrides {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub locked_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetOverrides {
    pub title: Option<String>,
    pub sub_title: Option<String>,
    pub confirm: Option<String>,
    pub back: Option<String>,
}

fn pick(value: Option<String>, default: String) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

impl TextOptions {
    /// Merge overrides into the defaults, producing a new table
    pub fn merged(overrides: TextOverrides) -> Self {
        let d = Self::default();
        let TextOverrides {
            enter,
            set,
            locked,
            reset,
        } = overrides;

        Self {
            enter: EnterText {
                title: pick(enter.title, d.enter.title),
                sub_title: pick(enter.sub_title, d.enter.sub_title),
                error: pick(enter.error, d.enter.error),
                back_space: pick(enter.back_space, d.enter.back_space),
                local_auth_button: pick(enter.local_auth_button, d.enter.local_auth_button),
                footer_text: pick(enter.footer_text, d.enter.footer_text),
            },
            set: SetText {
                title: pick(set.title, d.set.title),
                sub_title: pick(set.sub_title, d.set.sub_title),
                repeat: pick(set.repeat, d.set.repeat),
                error: pick(set.error, d.set.error),
                cancel: pick(set.cancel, d.set.cancel),
            },
            locked: LockedText {
                title: pick(locked.title, d.locked.title),
                sub_title: pick(locked.sub_title, d.locked.sub_title),
                locked_text: pick(locked.locked_text, d.locked.locked_text),
            },
            reset: ResetText {
                title: pick(reset.title, d.reset.title),
                sub_title: pick(reset.sub_title, d.reset.sub_title),
                confirm: pick(reset.confirm, d.reset.confirm),
                back: pick(reset.back, d.reset.back),
            },
        }
    }
}

/// Substitute the `{{pinLength}}` placeholder
pub fn with_pin_length(template: &str, pin_length: usize) -> String {
    template.replace("{{pinLength}}", &pin_length.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        let options = PinOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.pin_length, 4);
        assert_eq!(options.max_attempt, 4);
        assert_eq!(options.error_display(), options.retry_lock());
    }

    #[test]
    fn test_invalid_pin_length() {
        let options = PinOptions {
            pin_length: 0,
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(ConfigError::InvalidPinLength { got: 0, max: 12 })
        );

        let options = PinOptions {
            pin_length: 13,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_invalid_max_attempt() {
        let options = PinOptions {
            max_attempt: 0,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(ConfigError::InvalidMaxAttempt));
    }

    #[test]
    fn test_locked_duration_ignored_when_lock_disabled() {
        let options = PinOptions {
            locked_duration: 0,
            disable_lock: true,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: PinOptions =
            serde_json::from_str(r#"{"pinLength": 6, "randomPositions": true}"#).unwrap();
        assert_eq!(options.pin_length, 6);
        assert!(options.random_positions);
        assert_eq!(options.max_attempt, DEFAULT_MAX_ATTEMPT);
    }

    #[test]
    fn test_text_merge_keeps_defaults() {
        let overrides = TextOverrides {
            enter: EnterOverrides {
                title: Some("Unlock".into()),
                error: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = TextOptions::merged(overrides);
        let defaults = TextOptions::default();

        assert_eq!(merged.enter.title, "Unlock");
        assert_eq!(merged.enter.error, defaults.enter.error);
        assert_eq!(merged.set, defaults.set);
    }

    #[test]
    fn test_pin_length_placeholder() {
        let text = TextOptions::default();
        assert_eq!(
            with_pin_length(&text.enter.sub_title, 6),
            "Enter 6-digit PIN to access."
        );
    }
}
