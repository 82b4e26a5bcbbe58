//! Reusable UI components

pub mod keypad;
pub mod pin_dots;

pub use keypad::Keypad;
pub use pin_dots::pin_dots;
