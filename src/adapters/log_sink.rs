//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, `tracing-subscriber` on the
//! host).  Each line starts with a fixed tag so the console can be grepped.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    /// Prefix distinguishing the two controllers in a shared log.
    origin: &'static str,
}

impl LogEventSink {
    pub fn new(origin: &'static str) -> Self {
        Self { origin }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let o = self.origin;
        match event {
            AppEvent::LockStarted(state) => {
                info!("START | {} | initial_state={:?}", o, state);
            }
            AppEvent::LockStateChanged { from, to } => {
                info!("STATE | {} | {:?} -> {:?}", o, from, to);
            }
            AppEvent::TamperDetected => {
                warn!("TAMPER | {} | knock sensor triggered", o);
            }
            AppEvent::PinRejected => {
                warn!("PIN | {} | rejected", o);
            }
            AppEvent::BridgeStarted(state) => {
                info!("START | {} | initial_state={:?}", o, state);
            }
            AppEvent::LinkStateChanged { from, to } => {
                info!("LINK | {} | {:?} -> {:?}", o, from, to);
            }
            AppEvent::CommandForwarded(cmd) => {
                info!("CMD | {} | forwarded '{}'", o, cmd.as_str());
            }
            AppEvent::SignalObserved(code) => {
                info!("SIGNAL | {} | {} ({:?})", o, code, code);
            }
            AppEvent::StatusPublished(field) => {
                info!("STATUS | {} | wrote {}", o, field.path());
            }
            AppEvent::FactoryReset => {
                warn!("RESET | {} | network credentials erased", o);
            }
        }
    }
}
