//! Lock controller service.
//!
//! [`LockController`] owns the lock FSM and its context.  Each tick it
//! gathers inputs from the ports, runs the FSM, and applies the output
//! requests back to the ports.
//!
//! ```text
//!  Keypad / Door / Serial ──▶ ┌──────────────────┐ ──▶ EventSink
//!  TamperFlag (ISR)       ──▶ │  LockController  │
//!                             │  FSM · context   │
//!  Servo / LCD / Buzzer   ◀── │                  │
//!  LED / Signal lines     ◀── └──────────────────┘
//! ```
//!
//! Tick order: serial → tamper → keypad → FSM → status refresh → outputs.

use log::{debug, info, warn};

use crate::app::commands::RemoteCommand;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LockHardware};
use crate::config::LockConfig;
use crate::error::ProtocolError;
use crate::events::TamperFlag;
use crate::fsm::Fsm;
use crate::protocol::{ControlByte, LineAssembler, SerialFrame, SignalCode, TextToken};

use super::context::{LinkStatus, LockContext};
use super::states::LOCK_TABLE;
use super::LockState;

const LABEL: &str = "LOCK";

/// The lock controller orchestrates all lock-side domain logic.
pub struct LockController {
    fsm: Fsm<LockState, LockContext>,
    ctx: LockContext,
    rx: LineAssembler,
    /// Code last written to the signal lines.
    driven: SignalCode,
    tick_count: u64,
}

impl LockController {
    /// Construct the controller.  Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: LockConfig, tamper: &'static TamperFlag) -> Self {
        Self {
            fsm: Fsm::new(LABEL, &LOCK_TABLE, LockState::Locked),
            ctx: LockContext::new(config, tamper),
            rx: LineAssembler::new(),
            driven: SignalCode::Idle,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Pick the initial state from the door sensor (closed → `Locked`,
    /// open → `Unlocked`) and run its entry actions.
    pub fn start(&mut self, now_ms: u32, hw: &mut impl LockHardware, sink: &mut impl EventSink) {
        self.ctx.now_ms = now_ms;
        self.ctx.refresh_since.restart(now_ms);
        self.ctx.door_closed = hw.is_closed();

        let initial = if self.ctx.door_closed {
            LockState::Locked
        } else {
            LockState::Unlocked
        };
        self.fsm = Fsm::new(LABEL, &LOCK_TABLE, initial);
        self.fsm.start(&mut self.ctx);
        self.apply_outputs(hw);

        sink.emit(&AppEvent::LockStarted(initial));
        info!("LockController started in {:?}", initial);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    pub fn tick(&mut self, now_ms: u32, hw: &mut impl LockHardware, sink: &mut impl EventSink) {
        self.tick_count += 1;
        self.ctx.now_ms = now_ms;
        let prev_state = self.fsm.current_state();

        // 1. Sensors and serial input
        self.ctx.door_closed = hw.is_closed();
        self.ctx.command = self.poll_serial(hw);

        // 2. Tamper preempts everything except an alarm already running
        if self.ctx.tamper.take() {
            if self.fsm.current_state() == LockState::Alarm {
                debug!("LOCK: tamper while in alarm, ignored");
            } else {
                warn!("LOCK: tamper detected in {}", self.fsm.current_name());
                sink.emit(&AppEvent::TamperDetected);
                // A command decoded before the alarm existed must not act on it.
                if let Some(cmd) = self.ctx.command.take() {
                    warn!("LOCK: {} dropped, tamper preempts", cmd.as_str());
                }
                self.fsm.force_transition(LockState::Alarm, &mut self.ctx);
            }
        }

        // 3. Keypad (read in every state; handlers decide whether to use it)
        self.ctx.key = hw.next_key();

        // 4. FSM tick
        self.fsm.tick(&mut self.ctx);

        // 5. Periodic status refresh in the calm states
        if self
            .ctx
            .refresh_since
            .has_elapsed(now_ms, self.ctx.config.status_refresh_ms)
        {
            self.ctx.refresh_since.restart(now_ms);
            if self.fsm.current_state().is_calm() && self.ctx.out.screen.is_none() {
                self.ctx.show_status();
            }
        }

        // 6. Apply outputs
        self.apply_outputs(hw);

        // 7. Events
        if std::mem::take(&mut self.ctx.out.pin_rejected) {
            sink.emit(&AppEvent::PinRejected);
        }
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::LockStateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        self.ctx.key = None;
        self.ctx.command = None;
    }

    /// Tamper interrupt entry point.  Only raises the flag; the next tick
    /// does the work.
    pub fn on_tamper_edge(&self) {
        self.ctx.tamper.raise();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> LockState {
        self.fsm.current_state()
    }

    /// The lock flag (set on entry to `Locked` / `Unlocked`).
    pub fn is_locked(&self) -> bool {
        self.ctx.is_locked
    }

    /// Digits currently buffered.
    pub fn pin_len(&self) -> usize {
        self.ctx.pin.chars().count()
    }

    pub fn link_status(&self) -> LinkStatus {
        self.ctx.link
    }

    /// Code currently driven on the signal lines.
    pub fn signal(&self) -> SignalCode {
        self.driven
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Drain the UART until one peer command is decoded.  Link-status
    /// lines are applied on the spot; bytes after the first command stay
    /// queued for the next tick.
    fn poll_serial(&mut self, hw: &mut impl LockHardware) -> Option<RemoteCommand> {
        while let Some(byte) = hw.read_byte() {
            match self.rx.push(byte) {
                Some(SerialFrame::Control(ControlByte::Lock)) => return Some(RemoteCommand::Lock),
                Some(SerialFrame::Control(ControlByte::Unlock)) => {
                    return Some(RemoteCommand::Unlock);
                }
                Some(SerialFrame::Token(TextToken::Disarm)) => return Some(RemoteCommand::Disarm),
                Some(SerialFrame::Token(TextToken::WifiConnected)) => {
                    self.set_link(LinkStatus::Connected);
                }
                Some(SerialFrame::Token(TextToken::WifiDisconnected)) => {
                    self.set_link(LinkStatus::Disconnected);
                }
                Some(SerialFrame::Unknown(line)) => {
                    warn!("LOCK: {} {:?}", ProtocolError::UnknownLine, line.as_str());
                }
                Some(SerialFrame::Overflow) => warn!("LOCK: {}", ProtocolError::LineOverflow),
                None => {}
            }
        }
        None
    }

    fn set_link(&mut self, link: LinkStatus) {
        if self.ctx.link != link {
            info!("LOCK: {}", link.label());
        }
        self.ctx.link = link;
        if self.fsm.current_state().is_calm() {
            self.ctx.show_status();
        }
    }

    /// Translate output requests into port calls.
    fn apply_outputs(&mut self, hw: &mut impl LockHardware) {
        let out = &mut self.ctx.out;

        // ── Bolt and indicator ────────────────────────────────
        if let Some(position) = out.position.take() {
            hw.move_to(position);
        }
        if let Some(on) = out.indicator.take() {
            hw.set_indicator(on);
        }

        // ── Display ───────────────────────────────────────────
        if let Some(screen) = out.screen.take() {
            hw.render(&screen.line1, &screen.line2);
        }

        // ── Signal lines (before tones, which may block) ─────
        self.ctx.signal.release_expired(self.ctx.now_ms);
        let wanted = self.ctx.signal.value();
        if wanted != self.driven {
            if !self.driven.is_idle() && !wanted.is_idle() {
                hw.write_signal(SignalCode::Idle);
            }
            hw.write_signal(wanted);
            self.driven = wanted;
        }

        // ── Tones ─────────────────────────────────────────────
        for tone in self.ctx.out.tones.iter() {
            hw.beep(*tone);
        }
        self.ctx.out.tones.clear();
    }
}
