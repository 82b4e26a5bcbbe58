//! Mode controller for the PIN overlay
//!
//! Switches between Enter, Set, Reset and Locked and mounts a fresh entry
//! session on every switch into Enter. The overlay never hides itself; hosts
//! decide when to dismiss it (usually from `on_enter`,
//! `on_local_auth_success` or `on_set_success`).

use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::accumulator::{Append, DigitAccumulator};
use crate::biometric::{LocalAuthResolution, PendingLocalAuth};
use crate::config::{PinOptions, TextOptions, TextOverrides};
use crate::error::Result;
use crate::host::{comparable, Collaborators, PinHost, PinStore};
use crate::keypad::{generate_layout, KeyToken, KeypadLayout};
use crate::session::{EntrySession, LocalAuthOutcome, PressOutcome};

/// Presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Enter,
    Set,
    Locked,
    Reset,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Enter => "enter",
            Mode::Set => "set",
            Mode::Locked => "locked",
            Mode::Reset => "reset",
        };
        f.write_str(s)
    }
}

/// Progress within the current mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Initial,
    EnterFailed,
    EnterSucceeded,
    SetOnce,
    SetFailed,
    SetSucceeded,
    ResetPrompted,
    ResetSucceeded,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Initial => "initial",
            Status::EnterFailed => "enter.failed",
            Status::EnterSucceeded => "enter.succeeded",
            Status::SetOnce => "set.once",
            Status::SetFailed => "set.failed",
            Status::SetSucceeded => "set.succeeded",
            Status::ResetPrompted => "reset.prompted",
            Status::ResetSucceeded => "reset.succeeded",
        };
        f.write_str(s)
    }
}

/// Which half of the set flow is being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStep {
    First,
    Repeat,
}

/// Two-step new PIN entry
struct SetFlow {
    layout: KeypadLayout,
    accumulator: DigitAccumulator,
    first: Option<Zeroizing<String>>,
    error_until: Option<Instant>,
}

impl SetFlow {
    fn step(&self) -> SetStep {
        if self.first.is_some() {
            SetStep::Repeat
        } else {
            SetStep::First
        }
    }
}

/// Read-only view of the set flow for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetView<'a> {
    pub step: SetStep,
    pub entered: usize,
    pub pin_length: usize,
    pub error_visible: bool,
    pub layout: &'a KeypadLayout,
}

pub struct PinOverlay {
    options: PinOptions,
    text: TextOptions,
    store: Box<dyn PinStore>,
    collaborators: Collaborators,
    rng: StdRng,
    visible: bool,
    mode: Mode,
    status: Status,
    session: Option<EntrySession>,
    set_flow: Option<SetFlow>,
    locked_until: Option<Instant>,
}

impl PinOverlay {
    /// Create a hidden overlay; options are validated here
    pub fn new(
        options: PinOptions,
        text: TextOverrides,
        store: Box<dyn PinStore>,
        collaborators: Collaborators,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            text: TextOptions::merged(text),
            store,
            collaborators,
            rng: StdRng::from_entropy(),
            visible: false,
            mode: Mode::Enter,
            status: Status::Initial,
            session: None,
            set_flow: None,
            locked_until: None,
        })
    }

    /// Use a deterministic layout source
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Make the overlay visible in the mode the stored PIN implies.
    ///
    /// An unexpired lock is kept, whatever mode the overlay was left in.
    /// Returns the automatic biometric attempt, if one was started.
    pub fn show(&mut self, now: Instant, host: &mut dyn PinHost) -> Result<Option<PendingLocalAuth>> {
        self.visible = true;

        if self.locked_remaining(now).is_some() {
            debug!("overlay shown while locked");
            if self.mode != Mode::Locked {
                self.return_to_lock(host);
            }
            return Ok(None);
        }

        let mode = if self.store.get()?.is_some() {
            Mode::Enter
        } else {
            Mode::Set
        };
        self.switch_mode(mode, now, host)
    }

    /// Hide the overlay and unmount the session
    pub fn hide(&mut self) {
        self.visible = false;
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.session = None;
        self.set_flow = None;
    }

    /// Switch mode, remounting whatever the new mode needs
    pub fn switch_mode(
        &mut self,
        mode: Mode,
        now: Instant,
        host: &mut dyn PinHost,
    ) -> Result<Option<PendingLocalAuth>> {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.session = None;
        self.set_flow = None;
        self.mode = mode;

        let mut pending = None;
        let status = match mode {
            Mode::Enter => {
                let reference = self.store.get()?;
                let mut session = EntrySession::mount(
                    self.options.clone(),
                    reference,
                    self.collaborators.clone(),
                    &mut self.rng,
                )?;
                pending = session.maybe_auto_trigger();
                self.session = Some(session);
                self.locked_until = None;
                Status::Initial
            }
            Mode::Set => {
                self.set_flow = Some(SetFlow {
                    layout: generate_layout(self.options.random_positions, &mut self.rng),
                    accumulator: DigitAccumulator::new(self.options.pin_length),
                    first: None,
                    error_until: None,
                });
                Status::Initial
            }
            Mode::Locked => {
                self.locked_until = Some(now + self.options.locked());
                Status::Initial
            }
            Mode::Reset => Status::ResetPrompted,
        };

        info!(%mode, "overlay mode changed");
        host.on_mode_changed(mode);
        self.set_status(status, host);
        Ok(pending)
    }

    fn set_status(&mut self, status: Status, host: &mut dyn PinHost) {
        self.status = status;
        host.on_status_changed(self.mode, status);
    }

    /// Route a keypad token to the active mode.
    ///
    /// A completed set flow remounts Enter, which may start the automatic
    /// biometric attempt; it is returned to the caller.
    pub fn press(
        &mut self,
        token: KeyToken,
        now: Instant,
        host: &mut dyn PinHost,
    ) -> Result<Option<PendingLocalAuth>> {
        match self.mode {
            Mode::Enter => self.press_enter(token, now, host).map(|()| None),
            Mode::Set => self.press_set(token, now, host),
            Mode::Locked | Mode::Reset => Ok(None),
        }
    }

    fn press_enter(&mut self, token: KeyToken, now: Instant, host: &mut dyn PinHost) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        match session.press(token, now, host) {
            PressOutcome::Accepted => self.set_status(Status::EnterSucceeded, host),
            PressOutcome::Rejected { .. } => self.set_status(Status::EnterFailed, host),
            PressOutcome::MaxAttempt { .. } => {
                self.set_status(Status::EnterFailed, host);
                self.switch_mode(Mode::Locked, now, host)?;
            }
            PressOutcome::Ignored | PressOutcome::Updated { .. } => {}
        }
        Ok(())
    }

    fn press_set(
        &mut self,
        token: KeyToken,
        now: Instant,
        host: &mut dyn PinHost,
    ) -> Result<Option<PendingLocalAuth>> {
        let Some(flow) = self.set_flow.as_mut() else {
            return Ok(None);
        };

        if flow.accumulator.append(token) != Append::Complete {
            return Ok(None);
        }

        let entered = Zeroizing::new(flow.accumulator.sequence().to_owned());
        flow.accumulator.reset();

        let Some(first) = flow.first.take() else {
            flow.first = Some(entered);
            flow.error_until = None;
            self.set_status(Status::SetOnce, host);
            return Ok(None);
        };

        if first.as_str() != entered.as_str() {
            flow.error_until = Some(now + self.options.error_display());
            if let Err(e) = self.collaborators.haptics.pulse() {
                warn!("haptic pulse failed: {}", e);
            }
            self.set_status(Status::SetFailed, host);
            return Ok(None);
        }

        let stored = comparable(self.collaborators.hasher.as_ref(), &entered);
        self.store.set(&stored)?;
        info!("new PIN stored");
        host.on_set_success(&stored);
        self.set_status(Status::SetSucceeded, host);
        self.switch_mode(Mode::Enter, now, host)
    }

    /// Advance timers: retry window, error flags, Locked countdown.
    ///
    /// Leaving Locked mounts a fresh Enter session, which may start an
    /// automatic biometric attempt.
    pub fn tick(&mut self, now: Instant, host: &mut dyn PinHost) -> Result<Option<PendingLocalAuth>> {
        if let Some(session) = self.session.as_mut() {
            session.tick(now);
        }

        if let Some(flow) = self.set_flow.as_mut() {
            if matches!(flow.error_until, Some(at) if now >= at) {
                flow.error_until = None;
            }
        }

        if self.mode == Mode::Locked && self.locked_remaining(now).is_none() {
            info!("lock expired");
            return self.switch_mode(Mode::Enter, now, host);
        }

        Ok(None)
    }

    /// Start a user-requested biometric attempt
    pub fn trigger_local_auth(&mut self) -> Option<PendingLocalAuth> {
        if self.mode != Mode::Enter {
            return None;
        }
        self.session.as_mut()?.trigger_local_auth()
    }

    /// Feed back a biometric result; dropped if the session is gone
    pub fn resolve_local_auth(
        &mut self,
        resolution: LocalAuthResolution,
        host: &mut dyn PinHost,
    ) -> Option<LocalAuthOutcome> {
        match self.session.as_mut() {
            Some(session) => session.resolve_local_auth(resolution, host),
            None => {
                debug!("local auth result arrived after unmount");
                None
            }
        }
    }

    /// Open the reset prompt, if resets are allowed
    pub fn request_reset(&mut self, now: Instant, host: &mut dyn PinHost) -> Result<bool> {
        if !self.options.allow_reset || !matches!(self.mode, Mode::Enter | Mode::Locked) {
            return Ok(false);
        }
        host.on_reset();
        self.switch_mode(Mode::Reset, now, host)?;
        Ok(true)
    }

    /// Remove the stored PIN and move to Set
    pub fn confirm_reset(&mut self, now: Instant, host: &mut dyn PinHost) -> Result<()> {
        if self.mode != Mode::Reset {
            return Ok(());
        }
        self.store.delete()?;
        self.locked_until = None;
        info!("stored PIN removed");
        host.on_reset_success();
        self.set_status(Status::ResetSucceeded, host);
        self.switch_mode(Mode::Set, now, host)?;
        Ok(())
    }

    /// Leave the reset prompt without removing anything
    pub fn cancel_reset(
        &mut self,
        now: Instant,
        host: &mut dyn PinHost,
    ) -> Result<Option<PendingLocalAuth>> {
        if self.mode != Mode::Reset {
            return Ok(None);
        }
        if self.locked_remaining(now).is_some() {
            self.return_to_lock(host);
            return Ok(None);
        }
        self.switch_mode(Mode::Enter, now, host)
    }

    /// Go back to Locked keeping the original deadline
    fn return_to_lock(&mut self, host: &mut dyn PinHost) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.session = None;
        self.set_flow = None;
        self.mode = Mode::Locked;
        info!(mode = %Mode::Locked, "overlay mode changed");
        host.on_mode_changed(Mode::Locked);
        self.set_status(Status::Initial, host);
    }

    /// Carry over a lock that began before this overlay existed.
    ///
    /// Takes effect on the next `show`; an expired deadline is ignored.
    pub fn resume_lock(&mut self, until: Instant, now: Instant) {
        if until > now {
            info!(remaining = ?(until - now), "resuming lock");
            self.locked_until = Some(until);
        }
    }

    /// Deadline of the current lock, if one was imposed and not cleared
    pub fn locked_until(&self) -> Option<Instant> {
        self.locked_until
    }

    /// Start the set flow to change an existing PIN
    pub fn change_pin(&mut self, now: Instant, host: &mut dyn PinHost) -> Result<()> {
        self.visible = true;
        self.switch_mode(Mode::Set, now, host)?;
        Ok(())
    }

    /// Abandon the set flow; back to Enter if a PIN is stored
    pub fn cancel_set(
        &mut self,
        now: Instant,
        host: &mut dyn PinHost,
    ) -> Result<Option<PendingLocalAuth>> {
        if self.mode != Mode::Set {
            return Ok(None);
        }
        host.on_set_cancel();
        let mode = if self.store.get()?.is_some() {
            Mode::Enter
        } else {
            Mode::Set
        };
        self.switch_mode(mode, now, host)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn options(&self) -> &PinOptions {
        &self.options
    }

    pub fn text(&self) -> &TextOptions {
        &self.text
    }

    pub fn session(&self) -> Option<&EntrySession> {
        self.session.as_ref()
    }

    pub fn set_view(&self) -> Option<SetView<'_>> {
        self.set_flow.as_ref().map(|flow| SetView {
            step: flow.step(),
            entered: flow.accumulator.len(),
            pin_length: self.options.pin_length,
            error_visible: flow.error_until.is_some(),
            layout: &flow.layout,
        })
    }

    /// Keypad for the active mode
    pub fn layout(&self) -> Option<&KeypadLayout> {
        match self.mode {
            Mode::Enter => self.session.as_ref().map(|s| s.layout()),
            Mode::Set => self.set_flow.as_ref().map(|f| &f.layout),
            Mode::Locked | Mode::Reset => None,
        }
    }

    /// Time left in Locked mode
    pub fn locked_remaining(&self, now: Instant) -> Option<Duration> {
        self.locked_until
            .filter(|&until| now < until)
            .map(|until| until - now)
    }

    pub fn has_pin(&self) -> Result<bool> {
        Ok(self.store.get()?.is_some())
    }

    /// Earliest instant at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        let session = self.session.as_ref().and_then(|s| s.next_deadline());
        let set_error = self.set_flow.as_ref().and_then(|f| f.error_until);
        let locked = self.locked_until.filter(|_| self.mode == Mode::Locked);
        [session, set_error, locked].into_iter().flatten().min()
    }
}
