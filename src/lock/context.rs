//! Shared mutable context threaded through every lock state handler.
//!
//! `LockContext` is the blackboard: the service writes this tick's inputs
//! (time, key, peer command, door sensor) before the FSM runs, handlers
//! read them and write one-shot output requests, and the service applies
//! those requests to the hardware afterwards.

use crate::app::commands::RemoteCommand;
use crate::app::ports::{LockPosition, Tone};
use crate::config::LockConfig;
use crate::events::TamperFlag;
use crate::fsm::StateClock;
use crate::protocol::SignalCode;
use crate::timer::{Hold, Mark};

use super::LockState;

/// Columns on the character display.
pub const DISPLAY_COLS: usize = 16;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Network status as last reported by the bridge over serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl LinkStatus {
    /// Second display row in the calm states.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "WiFi: Unknown",
            Self::Connected => "WiFi: Connected",
            Self::Disconnected => "WiFi: Disconnected",
        }
    }
}

/// A transient message and the state to return to afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMessage {
    pub text: &'static str,
    pub duration_ms: u32,
    pub resume: LockState,
}

/// One full redraw of the display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    pub line1: heapless::String<DISPLAY_COLS>,
    pub line2: heapless::String<DISPLAY_COLS>,
}

impl Screen {
    /// Build a screen, truncating each row to the panel width.
    pub fn new(line1: &str, line2: &str) -> Self {
        Self {
            line1: fit(line1),
            line2: fit(line2),
        }
    }
}

fn fit(text: &str) -> heapless::String<DISPLAY_COLS> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Output requests (written by handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// One-shot hardware requests produced during a tick.
#[derive(Debug, Clone, Default)]
pub struct LockOutputs {
    pub position: Option<LockPosition>,
    pub indicator: Option<bool>,
    pub screen: Option<Screen>,
    pub tones: heapless::Vec<Tone, 4>,
    pub pin_rejected: bool,
}

// ---------------------------------------------------------------------------
// LockContext
// ---------------------------------------------------------------------------

/// The shared context passed to every lock state handler.
pub struct LockContext {
    // -- Timing --
    /// Monotonic milliseconds at the start of this tick.
    pub now_ms: u32,
    /// Entry time of the current state (restarted on every transition and,
    /// in `AwaitingPin`, on every key).
    pub state_since: Mark,
    /// Last periodic status-screen refresh.
    pub refresh_since: Mark,

    // -- Inputs for this tick --
    pub key: Option<char>,
    pub command: Option<RemoteCommand>,
    pub door_closed: bool,
    pub tamper: &'static TamperFlag,

    // -- State data --
    /// Buffered PIN digits.  Non-empty only in `AwaitingPin`.
    pub pin: String,
    /// Set on entry to `Locked` / `Unlocked`.
    pub is_locked: bool,
    /// Lock state a PIN entry started from.
    pub entry_from: LockState,
    pub message: Option<PendingMessage>,
    pub link: LinkStatus,

    // -- Outputs --
    pub out: LockOutputs,
    /// Code currently driven on the signal lines.
    pub signal: Hold<SignalCode>,

    // -- Configuration --
    pub config: LockConfig,
}

impl LockContext {
    pub fn new(config: LockConfig, tamper: &'static TamperFlag) -> Self {
        Self {
            now_ms: 0,
            state_since: Mark::at(0),
            refresh_since: Mark::at(0),
            key: None,
            command: None,
            door_closed: false,
            tamper,
            pin: String::new(),
            is_locked: true,
            entry_from: LockState::Locked,
            message: None,
            link: LinkStatus::Unknown,
            out: LockOutputs::default(),
            signal: Hold::new(SignalCode::Idle, config.signal_hold_ms),
            config,
        }
    }

    /// True once `duration_ms` has passed since the current state was
    /// entered (or the PIN timer was last restarted).
    pub fn in_state_for(&self, duration_ms: u32) -> bool {
        self.state_since.has_elapsed(self.now_ms, duration_ms)
    }

    /// Request a full redraw.
    pub fn show(&mut self, line1: &str, line2: &str) {
        self.out.screen = Some(Screen::new(line1, line2));
    }

    /// Request the calm-state status screen.
    pub fn show_status(&mut self) {
        let line1 = if self.is_locked {
            "Status: LOCKED"
        } else {
            "Status: UNLOCKED"
        };
        self.show(line1, self.link.label());
    }

    /// Request the PIN entry screen with the buffer masked.
    pub fn show_pin_entry(&mut self) {
        let mut masked = heapless::String::<DISPLAY_COLS>::new();
        for _ in self.pin.chars().take(DISPLAY_COLS) {
            let _ = masked.push('*');
        }
        self.show("Enter PIN:", &masked);
    }

    pub fn beep(&mut self, tone: Tone) {
        if self.out.tones.push(tone).is_err() {
            log::warn!("LOCK: tone queue full, dropping {:?}", tone);
        }
    }

    /// Replace the code on the signal lines and restart its hold.
    pub fn assert_signal(&mut self, code: SignalCode) {
        self.signal.assert(code, self.now_ms);
    }

    /// Queue a transient message.  Returns the state to move to.
    pub fn flash_message(&mut self, text: &'static str, resume: LockState) -> LockState {
        self.message = Some(PendingMessage {
            text,
            duration_ms: self.config.message_ms,
            resume,
        });
        LockState::ShowingMessage
    }
}

impl StateClock for LockContext {
    fn mark_state_entry(&mut self) {
        self.state_since.restart(self.now_ms);
    }
}
