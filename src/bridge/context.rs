//! Shared mutable context threaded through every bridge state handler.
//!
//! The service samples the ports that matter for the current state into
//! the context before the FSM runs (the blocking join only happens in
//! `JoiningNetwork`, the mailbox is only read while `Operational`).
//! Handlers queue serial messages, status writes and side effects; the
//! service performs them afterwards and logs any failure.

use crate::app::commands::RemoteCommand;
use crate::app::ports::{FieldValue, StatusField, StoreError};
use crate::config::BridgeConfig;
use crate::fsm::StateClock;
use crate::protocol::SignalCode;
use crate::timer::{Latch, Mark};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Outcome of one mailbox poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mailbox {
    /// Absent, `""` or `"null"`.
    Empty,
    Command(RemoteCommand),
    /// A non-empty value that is not a known command.
    Unrecognized(String),
    /// The read itself failed.
    Failed(StoreError),
}

impl Mailbox {
    /// Classify a raw mailbox read.
    pub fn from_read(read: Result<Option<String>, StoreError>) -> Self {
        match read {
            Err(e) => Self::Failed(e),
            Ok(None) => Self::Empty,
            Ok(Some(raw)) => match RemoteCommand::parse(&raw) {
                Ok(None) => Self::Empty,
                Ok(Some(cmd)) => Self::Command(cmd),
                Err(_) => Self::Unrecognized(raw),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Output requests
// ---------------------------------------------------------------------------

/// Side effects requested during a tick, applied by the service in field
/// order.
#[derive(Debug, Clone, Default)]
pub struct BridgeOutputs {
    /// Begin a store session.
    pub start_session: bool,
    /// Reset the mailbox to `""`.
    pub clear_mailbox: bool,
    /// Messages for the lock controller.
    pub serial: heapless::Vec<&'static [u8], 4>,
    /// Status writes, in order.
    pub publish: heapless::Vec<(StatusField, FieldValue), 8>,
    /// Erase stored network credentials.
    pub reset_credentials: bool,
    /// Command forwarded this tick (for the event stream).
    pub forwarded: Option<RemoteCommand>,
    /// Signal edge observed this tick (for the event stream).
    pub observed: Option<SignalCode>,
}

// ---------------------------------------------------------------------------
// BridgeContext
// ---------------------------------------------------------------------------

/// The shared context passed to every bridge state handler.
pub struct BridgeContext {
    // -- Timing --
    pub now_ms: u32,
    pub state_since: Mark,
    /// Wall clock at the start of this tick, if synced.
    pub unix_time: Option<u64>,

    // -- Inputs for this tick --
    /// Result of the join attempt (only set in `JoiningNetwork`).
    pub joined: Option<bool>,
    pub link_up: bool,
    pub session_ready: bool,
    pub mailbox: Option<Mailbox>,
    /// Raw signal-line bits (only sampled while `Operational`).
    pub signal_bits: u8,

    // -- State data --
    /// Previous signal sample, for edge detection.
    pub last_signal: SignalCode,
    /// `alert = "knock"` is set.
    pub tamper_alert: Latch,
    /// `mode = "registration"` is set.
    pub registration: Latch,

    // -- Outputs --
    pub out: BridgeOutputs,

    // -- Configuration --
    pub config: BridgeConfig,
}

impl BridgeContext {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            now_ms: 0,
            state_since: Mark::at(0),
            unix_time: None,
            joined: None,
            link_up: false,
            session_ready: false,
            mailbox: None,
            signal_bits: 0,
            last_signal: SignalCode::Idle,
            tamper_alert: Latch::new(config.tamper_alert_ms),
            registration: Latch::new(config.registration_ms),
            out: BridgeOutputs::default(),
            config,
        }
    }

    pub fn in_state_for(&self, duration_ms: u32) -> bool {
        self.state_since.has_elapsed(self.now_ms, duration_ms)
    }

    /// Queue a message for the lock controller.
    pub fn send(&mut self, bytes: &'static [u8]) {
        if self.out.serial.push(bytes).is_err() {
            log::warn!("BRIDGE: serial queue full, dropping message");
        }
    }

    /// Queue a status write.
    pub fn publish(&mut self, field: StatusField, value: FieldValue) {
        if self.out.publish.push((field, value)).is_err() {
            log::warn!("BRIDGE: publish queue full, dropping {}", field.path());
        }
    }

    /// Forget temporary modes and signal history (store unreachable).
    pub fn drop_session_state(&mut self) {
        self.tamper_alert.disarm();
        self.registration.disarm();
        self.last_signal = SignalCode::Idle;
    }
}

impl StateClock for BridgeContext {
    fn mark_state_entry(&mut self) {
        self.state_since.restart(self.now_ms);
    }
}
