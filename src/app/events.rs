//! Outbound application events.
//!
//! Both controller services emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; [`LogEventSink`] writes them to the
//! log.
//!
//! [`LogEventSink`]: crate::adapters::log_sink::LogEventSink

use crate::bridge::ConnectivityState;
use crate::lock::LockState;
use crate::protocol::SignalCode;

use super::commands::RemoteCommand;
use super::ports::StatusField;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The lock controller has started (carries initial state).
    LockStarted(LockState),

    /// The lock FSM transitioned between states.
    LockStateChanged { from: LockState, to: LockState },

    /// The vibration sensor fired outside `Alarm`.
    TamperDetected,

    /// A submitted PIN matched neither credential.
    PinRejected,

    /// The bridge has started (carries initial state).
    BridgeStarted(ConnectivityState),

    /// The bridge FSM transitioned between states.
    LinkStateChanged {
        from: ConnectivityState,
        to: ConnectivityState,
    },

    /// A mailbox command was forwarded to the lock.
    CommandForwarded(RemoteCommand),

    /// A changed signal code was observed on the status lines.
    SignalObserved(SignalCode),

    /// A status field was written to the remote store.
    StatusPublished(StatusField),

    /// Stored network credentials were erased.
    FactoryReset,
}
