//! Keypad layout generation
//!
//! Digits are laid out in rows of three. The final row always carries a
//! blank filler before its digits and the delete key after them. With
//! `randomize` set the digits are shuffled; the delete key never is.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

/// Digits per keypad row
pub const ROW_SIZE: usize = 3;

/// Canonical digit order
const DIGITS: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 0];

/// A single keypad slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    /// Decimal digit 0-9
    Digit(u8),
    /// Remove the last entered digit
    Delete,
    /// Empty filler slot
    Blank,
}

impl KeyToken {
    /// Parse a keyboard character into a token
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| KeyToken::Digit(d as u8))
    }

    pub fn is_digit(&self) -> bool {
        matches!(self, KeyToken::Digit(_))
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Digit(d) => write!(f, "{}", d),
            KeyToken::Delete => write!(f, "delete"),
            KeyToken::Blank => Ok(()),
        }
    }
}

/// Spatial arrangement of keypad buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadLayout {
    rows: Vec<Vec<KeyToken>>,
}

impl KeypadLayout {
    /// Canonical ascending layout
    pub fn canonical() -> Self {
        Self::from_digits(&DIGITS)
    }

    /// Layout with digit positions shuffled by `rng`
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut digits = DIGITS;
        digits.shuffle(rng);
        Self::from_digits(&digits)
    }

    fn from_digits(digits: &[u8]) -> Self {
        let mut rows: Vec<Vec<KeyToken>> = digits
            .chunks(ROW_SIZE)
            .map(|chunk| chunk.iter().map(|&d| KeyToken::Digit(d)).collect())
            .collect();

        if let Some(last) = rows.last_mut() {
            if last.len() < ROW_SIZE {
                last.insert(0, KeyToken::Blank);
            }
            last.push(KeyToken::Delete);
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<KeyToken>] {
        &self.rows
    }

    /// Token at a grid position
    pub fn token_at(&self, row: usize, col: usize) -> Option<KeyToken> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Grid position of a token
    pub fn position_of(&self, token: KeyToken) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|&t| t == token)
                .map(|c| (r, c))
        })
    }

    /// All tokens in reading order
    pub fn tokens(&self) -> impl Iterator<Item = KeyToken> + '_ {
        self.rows.iter().flatten().copied()
    }
}

/// Produce a keypad layout, shuffled when `randomize` is set
pub fn generate_layout<R: Rng + ?Sized>(randomize: bool, rng: &mut R) -> KeypadLayout {
    if randomize {
        KeypadLayout::shuffled(rng)
    } else {
        KeypadLayout::canonical()
    }
}
