//! Overlay callbacks for the terminal host

use pinpad_core::{BiometricError, Mode, PinHost, Status};
use tracing::{debug, info, warn};

/// Severity of a notice line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One-line message shown under the active screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Records overlay callbacks for the app loop to act on
#[derive(Debug, Default)]
pub struct TuiHost {
    dismiss: bool,
    notice: Option<Notice>,
    unlocks: u32,
}

impl TuiHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a callback asked for the overlay to close; clears the request
    pub fn take_dismiss(&mut self) -> bool {
        std::mem::take(&mut self.dismiss)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Successful unlocks since start
    pub fn unlocks(&self) -> u32 {
        self.unlocks
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        });
    }

    fn unlock(&mut self, how: &str) {
        self.unlocks += 1;
        self.dismiss = true;
        info!("Unlocked with {}", how);
        self.info(format!("Unlocked with {}", how));
    }
}

impl PinHost for TuiHost {
    fn on_enter(&mut self, _pin: &str) {
        self.unlock("PIN");
    }

    fn on_max_attempt(&mut self) {
        warn!("Too many wrong PIN entries");
        self.error("Too many wrong PIN entries");
    }

    fn on_reset(&mut self) {
        self.clear_notice();
    }

    fn on_local_auth_success(&mut self) {
        self.unlock("biometrics");
    }

    fn on_local_auth_error(&mut self, error: Option<&BiometricError>) {
        match error {
            Some(e) => self.error(format!("Biometrics failed: {}", e)),
            None => self.error("Biometrics not recognized"),
        }
    }

    fn on_set_success(&mut self, _pin: &str) {
        self.dismiss = true;
        self.info("PIN saved");
    }

    fn on_set_cancel(&mut self) {
        self.info("PIN change cancelled");
    }

    fn on_reset_success(&mut self) {
        self.info("PIN removed. Choose a new one.");
    }

    fn on_mode_changed(&mut self, mode: Mode) {
        debug!(%mode, "mode changed");
        // Errors belong to the screen that raised them
        if matches!(mode, Mode::Enter | Mode::Set)
            && matches!(&self.notice, Some(n) if n.kind == NoticeKind::Error)
        {
            self.clear_notice();
        }
    }

    fn on_status_changed(&mut self, mode: Mode, status: Status) {
        debug!(%mode, %status, "status changed");
    }
}
