//! Shared input gate
//!
//! Manual entry and the biometric prompt both need to disable the keypad.
//! Each flow takes its own hold; the keypad is open only when no hold is
//! present, and releasing one hold never clears another.

/// A reason for the keypad being disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// A completed entry is being compared
    Checking,
    /// Cooldown after a wrong entry
    Cooldown,
    /// Biometric prompt in flight
    Biometric,
}

impl Hold {
    fn bit(self) -> u8 {
        match self {
            Hold::Checking => 0b001,
            Hold::Cooldown => 0b010,
            Hold::Biometric => 0b100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputGate {
    holds: u8,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, hold: Hold) {
        self.holds |= hold.bit();
    }

    pub fn release(&mut self, hold: Hold) {
        self.holds &= !hold.bit();
    }

    pub fn holds(&self, hold: Hold) -> bool {
        self.holds & hold.bit() != 0
    }

    /// True when no flow holds the keypad
    pub fn is_open(&self) -> bool {
        self.holds == 0
    }

    pub fn clear(&mut self) {
        self.holds = 0;
    }
}
