//! Interrupt → tick hand-off.
//!
//! The vibration sensor ISR must not touch the FSM.  It only raises a
//! flag; the lock controller consumes the flag at the top of its next
//! tick.
//!
//! ```text
//! ┌─────────────┐  raise()   ┌────────────┐  take()   ┌──────────────┐
//! │ Tamper ISR  │──────────▶│ TamperFlag │─────────▶│ Lock tick    │
//! └─────────────┘            └────────────┘           └──────────────┘
//! ```
//!
//! Single writer, single reader.  Multiple raises between two ticks
//! collapse into one observation.

use core::sync::atomic::{AtomicBool, Ordering};

/// Lock-free one-bit mailbox shared between an ISR and the main loop.
#[derive(Debug)]
pub struct TamperFlag {
    raised: AtomicBool,
}

impl TamperFlag {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Set the flag.  Safe to call from ISR context.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Consume the flag.  Returns `true` if it was raised since the last
    /// call.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }
}

impl Default for TamperFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The flag the vibration sensor ISR writes to.
pub static TAMPER_FLAG: TamperFlag = TamperFlag::new();
