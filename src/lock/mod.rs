//! Lock controller.
//!
//! Owns the bolt, keypad, display, buzzer, indicator LED, door sensor and
//! tamper sensor.  Six states, one active at a time:
//!
//! ```text
//!            ┌──────────[ 'U' ]──────────┐
//!            │                           ▼
//!        LOCKED ◀──[ 'L' / auto-lock ]── UNLOCKED
//!         │  ▲ ▲                           │
//!    [key]│  │ └──[ * / PIN ]─┐     [key]  │
//!         ▼  │                │            │
//!       AWAITING_PIN ◀────────┼────────────┘
//!         │      │            │
//!   [admin]  [wrong/timeout]  │
//!         ▼      ▼            │
//!    ADMIN_MODE  SHOWING_MESSAGE ──[duration]──▶ resume state
//!         │
//!      [dwell]──▶ LOCKED
//!
//!  Any state except ALARM ──[tamper]──▶ ALARM ──[DISARM]──▶ LOCKED
//! ```

pub mod context;
pub mod service;
pub mod states;

pub use context::{LinkStatus, LockContext, PendingMessage, Screen};
pub use service::LockController;

use crate::fsm::StateId;

/// Enumeration of all lock controller states.
/// Must stay in sync with [`states::LOCK_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LockState {
    Locked = 0,
    Unlocked = 1,
    AwaitingPin = 2,
    AdminMode = 3,
    ShowingMessage = 4,
    Alarm = 5,
}

impl LockState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Locked,
        Self::Unlocked,
        Self::AwaitingPin,
        Self::AdminMode,
        Self::ShowingMessage,
        Self::Alarm,
    ];

    /// States in which the status screen is shown and refreshed.
    pub const fn is_calm(self) -> bool {
        matches!(self, Self::Locked | Self::Unlocked)
    }
}

impl StateId for LockState {
    fn index(self) -> usize {
        self as usize
    }
}

/// True for keys that start or extend a PIN (`0`–`9`, `A`–`D`).
pub fn is_entry_key(key: char) -> bool {
    key.is_ascii_digit() || ('A'..='D').contains(&key)
}

/// Submits the buffered PIN.
pub const SUBMIT_KEY: char = '#';
/// Discards the buffered PIN.
pub const CANCEL_KEY: char = '*';
