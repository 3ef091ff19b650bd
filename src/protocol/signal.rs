//! 3-bit status signal codec.
//!
//! | Bits | Meaning            | Emitted by lock on entry to |
//! |------|--------------------|-----------------------------|
//! | 000  | idle               | (hold released)             |
//! | 001  | locked             | `Locked`                    |
//! | 010  | tamper             | `Alarm`                     |
//! | 011  | unlocked           | `Unlocked`                  |
//! | 100  | registration mode  | `AdminMode`                 |
//! | 111  | factory reset      | (reserved, external)        |
//!
//! Bit order on the wire is (registration, tamper, lock-status), MSB first.

use core::fmt;

/// Decoded value of the three signal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalCode {
    Idle,
    Locked,
    Tamper,
    Unlocked,
    Registration,
    FactoryReset,
    /// `101` or `110`: logged by the receiver, never acted on.
    Unrecognized(u8),
}

impl SignalCode {
    /// Decode the low three bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Idle,
            0b001 => Self::Locked,
            0b010 => Self::Tamper,
            0b011 => Self::Unlocked,
            0b100 => Self::Registration,
            0b111 => Self::FactoryReset,
            other => Self::Unrecognized(other),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Idle => 0b000,
            Self::Locked => 0b001,
            Self::Tamper => 0b010,
            Self::Unlocked => 0b011,
            Self::Registration => 0b100,
            Self::FactoryReset => 0b111,
            Self::Unrecognized(bits) => bits & 0b111,
        }
    }

    /// Pack three line levels MSB-first.
    pub const fn pack(registration: bool, tamper: bool, lock_status: bool) -> u8 {
        ((registration as u8) << 2) | ((tamper as u8) << 1) | (lock_status as u8)
    }

    /// Line levels as `[registration, tamper, lock_status]`.
    pub const fn lines(self) -> [bool; 3] {
        let bits = self.bits();
        [bits & 0b100 != 0, bits & 0b010 != 0, bits & 0b001 != 0]
    }

    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for SignalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03b}", self.bits())
    }
}
