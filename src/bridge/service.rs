//! Connectivity bridge service.
//!
//! [`Bridge`] owns the bridge FSM and its context.  The remote store is
//! passed separately from the board ports so either side can be swapped
//! in tests.
//!
//! ```text
//!  Wi-Fi / Clock / Signal lines ──▶ ┌──────────┐ ──▶ RemoteStore
//!  Serial (from lock)           ──▶ │  Bridge  │ ──▶ Serial (to lock)
//!                                   └──────────┘ ──▶ EventSink
//! ```

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{BridgeHardware, EventSink, RemoteStore};
use crate::config::BridgeConfig;
use crate::error::ProtocolError;
use crate::fsm::Fsm;
use crate::protocol::{LineAssembler, SerialFrame};

use super::context::{BridgeContext, Mailbox};
use super::states::BRIDGE_TABLE;
use super::ConnectivityState;

const LABEL: &str = "BRIDGE";

/// The bridge orchestrates network, store and signal-line handling.
pub struct Bridge {
    fsm: Fsm<ConnectivityState, BridgeContext>,
    ctx: BridgeContext,
    rx: LineAssembler,
    tick_count: u64,
}

impl Bridge {
    /// Construct the bridge.  Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            fsm: Fsm::new(LABEL, &BRIDGE_TABLE, ConnectivityState::JoiningNetwork),
            ctx: BridgeContext::new(config),
            rx: LineAssembler::new(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `JoiningNetwork`.  The join itself runs on the first tick.
    pub fn start(
        &mut self,
        hw: &mut impl BridgeHardware,
        store: &mut impl RemoteStore,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = hw.uptime_ms();
        self.fsm.start(&mut self.ctx);
        self.apply_outputs(hw, store, sink);
        sink.emit(&AppEvent::BridgeStarted(self.fsm.current_state()));
        info!("Bridge started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one bridge cycle: inputs for the current state → FSM → outputs.
    pub fn tick(
        &mut self,
        hw: &mut impl BridgeHardware,
        store: &mut impl RemoteStore,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        self.drain_serial(hw);
        self.ctx.joined = None;
        self.ctx.mailbox = None;

        match prev_state {
            ConnectivityState::JoiningNetwork => {
                let timeout = self.ctx.config.provision_timeout_secs;
                self.ctx.joined = Some(hw.join_or_provision(timeout));
            }
            ConnectivityState::EstablishingSession => {
                self.ctx.session_ready = store.is_session_ready();
            }
            ConnectivityState::Operational => {
                self.ctx.link_up = hw.is_connected();
                self.ctx.session_ready = store.is_session_ready();
                if self.ctx.link_up && self.ctx.session_ready {
                    self.ctx.mailbox = Some(Mailbox::from_read(store.read_command()));
                    self.ctx.signal_bits = hw.sample_signal();
                }
            }
            ConnectivityState::Disconnected => {}
        }

        // Read the clock after the (possibly long) join.
        self.ctx.now_ms = hw.uptime_ms();
        self.ctx.unix_time = hw.unix_time();

        self.fsm.tick(&mut self.ctx);

        self.apply_outputs(hw, store, sink);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::LinkStateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> ConnectivityState {
        self.fsm.current_state()
    }

    /// `alert = "knock"` is currently set.
    pub fn tamper_alert_active(&self) -> bool {
        self.ctx.tamper_alert.is_armed()
    }

    /// `mode = "registration"` is currently set.
    pub fn registration_active(&self) -> bool {
        self.ctx.registration.is_armed()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Log whatever the lock controller sent.  The lock has nothing to
    /// tell the bridge over serial, so every frame is diagnostic.
    fn drain_serial(&mut self, hw: &mut impl BridgeHardware) {
        while let Some(byte) = hw.read_byte() {
            match self.rx.push(byte) {
                Some(SerialFrame::Unknown(line)) => debug!("BRIDGE: lock says {:?}", line.as_str()),
                Some(SerialFrame::Overflow) => warn!("BRIDGE: {}", ProtocolError::LineOverflow),
                Some(other) => debug!("BRIDGE: unexpected frame from lock: {:?}", other),
                None => {}
            }
        }
    }

    /// Perform the side effects queued by the handlers.
    fn apply_outputs(
        &mut self,
        hw: &mut impl BridgeHardware,
        store: &mut impl RemoteStore,
        sink: &mut impl EventSink,
    ) {
        let out = core::mem::take(&mut self.ctx.out);

        if out.start_session {
            store.start_session();
        }

        for bytes in &out.serial {
            hw.write_bytes(bytes);
        }

        if out.clear_mailbox {
            if let Err(e) = store.clear_command() {
                warn!("BRIDGE: mailbox clear failed: {}", e);
            }
        }

        for (field, value) in &out.publish {
            match store.write_field(*field, value) {
                Ok(()) => sink.emit(&AppEvent::StatusPublished(*field)),
                Err(e) => warn!("CTX: write {} | ERR: {}", field.path(), e),
            }
        }

        if out.reset_credentials {
            match hw.reset_credentials() {
                Ok(()) => sink.emit(&AppEvent::FactoryReset),
                Err(e) => warn!("BRIDGE: credential reset failed: {}", e),
            }
        }

        if let Some(cmd) = out.forwarded {
            sink.emit(&AppEvent::CommandForwarded(cmd));
        }
        if let Some(code) = out.observed {
            sink.emit(&AppEvent::SignalObserved(code));
        }
    }
}
