//! Wraparound-safe timing primitives.
//!
//! Every timeout in the firmware is "time elapsed since a recorded mark",
//! computed on a `u32` millisecond counter with `wrapping_sub`.  The
//! counter wraps after ~49.7 days; the subtraction stays correct across
//! the wrap as long as no single interval exceeds half the range.
//!
//! | Type    | Use                                                    |
//! |---------|--------------------------------------------------------|
//! | `Mark`  | state-entry timestamp, "has N ms elapsed?"             |
//! | `Latch` | temporary mode with a deadline (arm once, expire once) |
//! | `Hold`  | output value that auto-clears after a hold interval    |

/// A recorded point on the monotonic millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mark {
    at_ms: u32,
}

impl Mark {
    pub const fn at(now_ms: u32) -> Self {
        Self { at_ms: now_ms }
    }

    /// Milliseconds elapsed since the mark.
    pub const fn elapsed(self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.at_ms)
    }

    /// True once at least `duration_ms` has elapsed since the mark.
    pub const fn has_elapsed(self, now_ms: u32, duration_ms: u32) -> bool {
        self.elapsed(now_ms) >= duration_ms
    }

    pub fn restart(&mut self, now_ms: u32) {
        self.at_ms = now_ms;
    }
}

/// A "currently in temporary mode" flag paired with its deadline.
///
/// `arm` only reports `true` on the idle → armed edge, and `expire` only
/// reports `true` on the armed → idle edge, so callers can attach their
/// side effects to the return value without extra bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latch {
    duration_ms: u32,
    armed_at: Option<Mark>,
}

impl Latch {
    pub const fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            armed_at: None,
        }
    }

    /// Arm the latch.  Returns `false` (and keeps the original deadline)
    /// if it was already armed.
    pub fn arm(&mut self, now_ms: u32) -> bool {
        if self.armed_at.is_some() {
            return false;
        }
        self.armed_at = Some(Mark::at(now_ms));
        true
    }

    /// Clear the latch if its deadline passed.  Returns `true` exactly once
    /// per arming.
    pub fn expire(&mut self, now_ms: u32) -> bool {
        match self.armed_at {
            Some(mark) if mark.has_elapsed(now_ms, self.duration_ms) => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the latch without reporting an expiry.
    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }
}

/// A value that is asserted for a bounded interval, then reverts to its
/// idle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hold<T: Copy + PartialEq> {
    idle: T,
    value: T,
    hold_ms: u32,
    since: Mark,
}

impl<T: Copy + PartialEq> Hold<T> {
    pub const fn new(idle: T, hold_ms: u32) -> Self {
        Self {
            idle,
            value: idle,
            hold_ms,
            since: Mark::at(0),
        }
    }

    /// Replace the held value and restart the hold interval.
    pub fn assert(&mut self, value: T, now_ms: u32) {
        self.value = value;
        self.since.restart(now_ms);
    }

    /// Revert to idle if the hold interval elapsed.  Returns `true` when
    /// this call performed the revert.
    pub fn release_expired(&mut self, now_ms: u32) -> bool {
        if self.value != self.idle && self.since.has_elapsed(now_ms, self.hold_ms) {
            self.value = self.idle;
            return true;
        }
        false
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn is_idle(&self) -> bool {
        self.value == self.idle
    }
}
