//! In-progress PIN entry buffer

use std::fmt;

use zeroize::Zeroizing;

use crate::keypad::KeyToken;

/// Result of feeding one token to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    /// Sequence changed and is still short of the PIN length
    Pending(usize),
    /// Sequence reached the PIN length
    Complete,
    /// Token had no effect
    Ignored,
}

/// Builds the entered digit sequence, bounded by the PIN length.
///
/// The accumulator never clears itself on completion; the caller clears it
/// once validation has resolved.
pub struct DigitAccumulator {
    buffer: Zeroizing<String>,
    pin_length: usize,
}

impl fmt::Debug for DigitAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitAccumulator")
            .field("len", &self.buffer.len())
            .field("pin_length", &self.pin_length)
            .finish()
    }
}

impl DigitAccumulator {
    pub fn new(pin_length: usize) -> Self {
        Self {
            buffer: Zeroizing::new(String::with_capacity(pin_length)),
            pin_length,
        }
    }

    /// Apply a keypad token
    pub fn append(&mut self, token: KeyToken) -> Append {
        match token {
            KeyToken::Delete => {
                if self.buffer.pop().is_some() {
                    Append::Pending(self.buffer.len())
                } else {
                    Append::Ignored
                }
            }
            KeyToken::Digit(d) if d <= 9 => {
                if self.buffer.len() >= self.pin_length {
                    return Append::Ignored;
                }
                self.buffer.push(char::from(b'0' + d));
                if self.buffer.len() == self.pin_length {
                    Append::Complete
                } else {
                    Append::Pending(self.buffer.len())
                }
            }
            _ => Append::Ignored,
        }
    }

    /// Clear the sequence, wiping the previous contents
    pub fn reset(&mut self) {
        // Zeroizing<String> wipes on drop; swap in a fresh buffer
        self.buffer = Zeroizing::new(String::with_capacity(self.pin_length));
    }

    pub fn sequence(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.buffer.len() == self.pin_length
    }

    pub fn pin_length(&self) -> usize {
        self.pin_length
    }
}
