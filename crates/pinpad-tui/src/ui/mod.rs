//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use std::time::Instant;

use pinpad_core::Mode;
use ratatui::prelude::*;

use crate::app::{App, Screen};

/// Main render function - delegates to appropriate screen
pub fn render(frame: &mut Frame, app: &App, now: Instant) {
    let area = frame.area();
    match app.screen() {
        Screen::Home => screens::home::draw(frame, area, app),
        Screen::Overlay(Mode::Enter) => screens::enter::draw(frame, area, app),
        Screen::Overlay(Mode::Set) => screens::set::draw(frame, area, app),
        Screen::Overlay(Mode::Locked) => screens::locked::draw(frame, area, app, now),
        Screen::Overlay(Mode::Reset) => screens::reset::draw(frame, area, app),
    }
}

/// Vertical slots shared by the keypad screens
pub(crate) struct KeypadScreen {
    pub sub_title: Rect,
    pub dots: Rect,
    pub message: Rect,
    pub keypad: Rect,
    pub notice: Rect,
    pub footer: Rect,
}

impl KeypadScreen {
    pub fn split(inner: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(2), // Subtitle
                Constraint::Length(1), // Spacer
                Constraint::Length(1), // PIN dots
                Constraint::Length(1), // Error / hint
                Constraint::Length(1), // Spacer
                Constraint::Length(7), // Keypad
                Constraint::Min(0),    // Spacer
                Constraint::Length(1), // Notice
                Constraint::Length(2), // Footer
            ])
            .split(inner);

        Self {
            sub_title: chunks[0],
            dots: chunks[2],
            message: chunks[3],
            keypad: chunks[5],
            notice: chunks[7],
            footer: chunks[8],
        }
    }
}
