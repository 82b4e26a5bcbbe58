//! Application state

use chrono::{DateTime, Utc};
use pinpad_core::{KeyToken, KeypadLayout, Mode};

/// Current screen/view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Unlocked home menu
    Home,
    /// Overlay in the given mode
    Overlay(Mode),
}

/// Home menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeItem {
    Lock,
    ChangePin,
    Quit,
}

impl HomeItem {
    pub const ALL: [HomeItem; 3] = [HomeItem::Lock, HomeItem::ChangePin, HomeItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            HomeItem::Lock => "Lock now",
            HomeItem::ChangePin => "Change PIN",
            HomeItem::Quit => "Quit",
        }
    }
}

/// Keypad cursor position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    /// Move by one cell, staying inside the layout
    pub fn step(&mut self, layout: &KeypadLayout, d_row: isize, d_col: isize) {
        let rows = layout.rows();
        if rows.is_empty() {
            return;
        }
        let row = self.row.saturating_add_signed(d_row).min(rows.len() - 1);
        let width = rows[row].len().max(1);
        let col = self.col.saturating_add_signed(d_col).min(width - 1);
        self.row = row;
        self.col = col;
    }

    /// Park on the first digit of a fresh layout
    pub fn home(layout: &KeypadLayout) -> Self {
        layout
            .rows()
            .iter()
            .enumerate()
            .find_map(|(row, tokens)| {
                tokens
                    .iter()
                    .position(|t| t.is_digit())
                    .map(|col| Cursor { row, col })
            })
            .unwrap_or_default()
    }

    pub fn token(&self, layout: &KeypadLayout) -> Option<KeyToken> {
        layout.token_at(self.row, self.col)
    }
}

/// Application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Home menu selection index
    pub menu_index: usize,

    /// Keypad cursor
    pub cursor: Cursor,

    /// Set flow was opened from the home menu rather than first run
    pub changing_pin: bool,

    /// When the stored PIN was last set
    pub last_changed: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_item(&self) -> HomeItem {
        HomeItem::ALL[self.menu_index.min(HomeItem::ALL.len() - 1)]
    }
}
