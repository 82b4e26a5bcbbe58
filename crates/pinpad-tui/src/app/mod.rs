//! Application state and event handling

mod config;
mod events;
mod host;
mod state;

pub use config::{ConfigError, TuiConfig};
pub use events::{poll_keyboard, Event, EventHandler};
pub use host::{Notice, NoticeKind, TuiHost};
pub use state::{AppState, Cursor, HomeItem, Screen};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::KeyCode;
use pinpad_core::{Collaborators, KeyToken, Mode, PendingLocalAuth, PinOverlay, PinStore};
use ratatui::prelude::*;
use tokio::runtime::Handle;

use crate::auth::FilePinStore;
use crate::ui::{self, Theme};

/// Redraw interval when no timer is pending
const TICK_RATE: Duration = Duration::from_millis(250);

/// Main application struct
pub struct App {
    /// The PIN overlay
    pub overlay: PinOverlay,

    /// Callback sink
    pub host: TuiHost,

    /// Navigation state
    pub state: AppState,

    /// Color palette
    pub theme: Theme,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Async bridge for biometric prompts
    events: EventHandler,

    /// PIN file, for the "last changed" line and the persisted lock
    pin_file: PathBuf,

    /// Lock deadline last written to the PIN file
    persisted_lock: Option<Instant>,
}

impl App {
    /// Create the app and show the overlay
    pub fn new(
        config: &TuiConfig,
        store: Box<dyn PinStore>,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> Result<Self> {
        let mut overlay =
            PinOverlay::new(config.pin.clone(), config.text.clone(), store, collaborators)
                .context("Invalid PIN options")?;

        // A lock from a previous run still applies
        let now = Instant::now();
        let pin_file = config.pin_file_path();
        let mut persisted_lock = None;
        match FilePinStore::new(&pin_file).locked_until() {
            Ok(Some(at)) => {
                if let Ok(remaining) = (at - Utc::now()).to_std() {
                    overlay.resume_lock(now + remaining, now);
                    persisted_lock = overlay.locked_until();
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read lock state: {}", e),
        }

        let mut app = Self {
            overlay,
            host: TuiHost::new(),
            state: AppState::new(),
            theme: if config.high_contrast {
                Theme::high_contrast()
            } else {
                Theme::default()
            },
            should_quit: false,
            events: EventHandler::new(runtime),
            pin_file,
            persisted_lock,
        };
        app.lock(now)?;
        Ok(app)
    }

    /// Current screen, derived from the overlay
    pub fn screen(&self) -> Screen {
        if self.overlay.is_visible() {
            Screen::Overlay(self.overlay.mode())
        } else {
            Screen::Home
        }
    }

    /// Run the application main loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            let now = Instant::now();
            terminal.draw(|frame| ui::render(frame, self, now))?;

            // Wake early for the next overlay timer
            let timeout = self
                .overlay
                .next_deadline()
                .map(|at| at.saturating_duration_since(now).min(TICK_RATE))
                .unwrap_or(TICK_RATE);

            if let Some(key) = poll_keyboard(timeout)? {
                self.handle_key(key.code, Instant::now())?;
            }

            self.drain_events();
            self.tick(Instant::now())?;
        }

        Ok(())
    }

    /// Show the overlay over the home screen
    pub fn lock(&mut self, now: Instant) -> Result<()> {
        let pending = self.overlay.show(now, &mut self.host)?;
        self.state.changing_pin = false;
        self.after_overlay(pending);
        Ok(())
    }

    /// Advance overlay timers
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        let pending = self.overlay.tick(now, &mut self.host)?;
        self.after_overlay(pending);
        Ok(())
    }

    /// Apply finished biometric attempts
    pub fn drain_events(&mut self) {
        while let Some(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::LocalAuth(resolution) => {
                self.overlay.resolve_local_auth(resolution, &mut self.host);
                self.after_overlay(None);
            }
        }
    }

    /// Dismiss if a callback asked for it, otherwise start any new attempt
    fn after_overlay(&mut self, pending: Option<PendingLocalAuth>) {
        self.persist_lock();

        if self.host.take_dismiss() {
            // Hiding unmounts the session, which orphans `pending`
            self.overlay.hide();
            self.state.changing_pin = false;
            self.state.menu_index = 0;
            self.refresh_last_changed();
            return;
        }

        if let Some(pending) = pending {
            self.events.spawn_local_auth(pending);
        }

        if let Some(layout) = self.overlay.layout() {
            if self.state.cursor.token(layout).is_none() {
                self.state.cursor = Cursor::home(layout);
            }
        }
    }

    /// Mirror the overlay's lock deadline into the PIN file as wall-clock time
    fn persist_lock(&mut self) {
        let until = self.overlay.locked_until();
        if until == self.persisted_lock {
            return;
        }

        let wall = until.map(|at| {
            let remaining = chrono::Duration::from_std(at.saturating_duration_since(Instant::now()))
                .unwrap_or_else(|_| chrono::Duration::zero());
            Utc::now() + remaining
        });
        match FilePinStore::new(&self.pin_file).set_locked_until(wall) {
            Ok(()) => self.persisted_lock = until,
            Err(e) => tracing::warn!("Failed to record lock state: {}", e),
        }
    }

    fn refresh_last_changed(&mut self) {
        match FilePinStore::new(&self.pin_file).last_changed() {
            Ok(changed) => self.state.last_changed = changed,
            Err(e) => tracing::warn!("Failed to read PIN file: {}", e),
        }
    }

    /// Handle key press events
    pub fn handle_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        match self.screen() {
            Screen::Home => self.handle_home_key(key, now),
            Screen::Overlay(Mode::Enter) => self.handle_enter_key(key, now),
            Screen::Overlay(Mode::Set) => self.handle_set_key(key, now),
            Screen::Overlay(Mode::Locked) => self.handle_locked_key(key, now),
            Screen::Overlay(Mode::Reset) => self.handle_reset_key(key, now),
        }
    }

    fn handle_home_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.menu_index = self.state.menu_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.menu_index < HomeItem::ALL.len() - 1 {
                    self.state.menu_index += 1;
                }
            }
            KeyCode::Enter => match self.state.selected_item() {
                HomeItem::Lock => self.lock(now)?,
                HomeItem::ChangePin => self.change_pin(now)?,
                HomeItem::Quit => self.should_quit = true,
            },
            KeyCode::Char('l') => self.lock(now)?,
            KeyCode::Char('c') => self.change_pin(now)?,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn change_pin(&mut self, now: Instant) -> Result<()> {
        self.host.clear_notice();
        self.overlay.change_pin(now, &mut self.host)?;
        self.state.changing_pin = true;
        self.after_overlay(None);
        Ok(())
    }

    /// Keys shared by the Enter and Set keypads; true if consumed
    fn handle_keypad_key(&mut self, key: KeyCode, now: Instant) -> Result<bool> {
        let token = match key {
            KeyCode::Char(c) if c.is_ascii_digit() => KeyToken::from_char(c),
            KeyCode::Backspace | KeyCode::Delete => Some(KeyToken::Delete),
            KeyCode::Enter | KeyCode::Char(' ') => self
                .overlay
                .layout()
                .and_then(|layout| self.state.cursor.token(layout)),
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                let (d_row, d_col) = match key {
                    KeyCode::Up => (-1, 0),
                    KeyCode::Down => (1, 0),
                    KeyCode::Left => (0, -1),
                    _ => (0, 1),
                };
                if let Some(layout) = self.overlay.layout() {
                    self.state.cursor.step(layout, d_row, d_col);
                }
                return Ok(true);
            }
            _ => return Ok(false),
        };

        if let Some(token) = token {
            let pending = self.overlay.press(token, now, &mut self.host)?;
            self.after_overlay(pending);
        }
        Ok(true)
    }

    fn handle_enter_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        if self.handle_keypad_key(key, now)? {
            return Ok(());
        }
        match key {
            KeyCode::Char('b') => {
                let pending = self.overlay.trigger_local_auth();
                self.after_overlay(pending);
            }
            KeyCode::Char('r') => {
                self.overlay.request_reset(now, &mut self.host)?;
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_set_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        if self.handle_keypad_key(key, now)? {
            return Ok(());
        }
        if key == KeyCode::Esc {
            let pending = self.overlay.cancel_set(now, &mut self.host)?;
            if self.state.changing_pin {
                // Back to the home menu, still unlocked
                drop(pending);
                self.overlay.hide();
                self.state.changing_pin = false;
            } else {
                self.after_overlay(pending);
            }
        }
        Ok(())
    }

    fn handle_locked_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        match key {
            KeyCode::Char('r') => {
                self.overlay.request_reset(now, &mut self.host)?;
                self.after_overlay(None);
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_reset_key(&mut self, key: KeyCode, now: Instant) -> Result<()> {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.overlay.confirm_reset(now, &mut self.host)?;
                self.after_overlay(None);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                let pending = self.overlay.cancel_reset(now, &mut self.host)?;
                self.after_overlay(pending);
            }
            _ => {}
        }
        Ok(())
    }
}
