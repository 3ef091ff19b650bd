//! Lock state handler functions and the static state table.
//!
//! Each state is three plain `fn` pointers: no closures, no dynamic
//! dispatch.  Entry actions run exactly once per transition; update
//! handlers run every tick and return the next state, if any.
//!
//! Tamper preemption is not handled here: the service forces `Alarm`
//! before `on_update` runs.

use log::{debug, info, warn};

use super::context::LockContext;
use super::{is_entry_key, LockState, CANCEL_KEY, SUBMIT_KEY};
use crate::app::commands::RemoteCommand;
use crate::app::ports::{LockPosition, Tone};
use crate::error::ProtocolError;
use crate::fsm::StateDescriptor;
use crate::protocol::SignalCode;

// ═══════════════════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════════════════

/// The lock state table, indexed by `LockState as usize`.
pub static LOCK_TABLE: [StateDescriptor<LockState, LockContext>; LockState::COUNT] = [
    // Index 0: Locked
    StateDescriptor {
        id: LockState::Locked,
        name: "Locked",
        on_enter: Some(locked_enter),
        on_exit: None,
        on_update: locked_update,
    },
    // Index 1: Unlocked
    StateDescriptor {
        id: LockState::Unlocked,
        name: "Unlocked",
        on_enter: Some(unlocked_enter),
        on_exit: None,
        on_update: unlocked_update,
    },
    // Index 2: AwaitingPin
    StateDescriptor {
        id: LockState::AwaitingPin,
        name: "AwaitingPin",
        on_enter: Some(awaiting_pin_enter),
        on_exit: Some(awaiting_pin_exit),
        on_update: awaiting_pin_update,
    },
    // Index 3: AdminMode
    StateDescriptor {
        id: LockState::AdminMode,
        name: "AdminMode",
        on_enter: Some(admin_enter),
        on_exit: None,
        on_update: admin_update,
    },
    // Index 4: ShowingMessage
    StateDescriptor {
        id: LockState::ShowingMessage,
        name: "ShowingMessage",
        on_enter: Some(message_enter),
        on_exit: Some(message_exit),
        on_update: message_update,
    },
    // Index 5: Alarm
    StateDescriptor {
        id: LockState::Alarm,
        name: "Alarm",
        on_enter: Some(alarm_enter),
        on_exit: Some(alarm_exit),
        on_update: alarm_update,
    },
];

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Start a PIN entry with `key` as the first digit.
fn begin_entry(ctx: &mut LockContext, key: char, from: LockState) -> Option<LockState> {
    ctx.pin.clear();
    ctx.pin.push(key);
    ctx.entry_from = from;
    Some(LockState::AwaitingPin)
}

/// Log and drop a peer command the current state does not accept.
fn drop_command(ctx: &LockContext, state: &str) {
    if let Some(cmd) = ctx.command {
        let err = match cmd.control_byte() {
            Some(control) => ProtocolError::UnexpectedControl(control.as_byte()),
            None => ProtocolError::UnknownLine,
        };
        warn!("LOCK: {} in {}, dropped ({})", cmd.as_str(), state, err);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKED
// ═══════════════════════════════════════════════════════════════════════════

fn locked_enter(ctx: &mut LockContext) {
    ctx.pin.clear();
    ctx.is_locked = true;
    ctx.out.position = Some(LockPosition::Locked);
    ctx.out.indicator = Some(true);
    ctx.show_status();
    ctx.assert_signal(SignalCode::Locked);
    info!("LOCK: bolt engaged");
}

fn locked_update(ctx: &mut LockContext) -> Option<LockState> {
    match ctx.command {
        Some(RemoteCommand::Unlock) => {
            info!("LOCK: remote unlock");
            return Some(LockState::Unlocked);
        }
        Some(RemoteCommand::Lock) => debug!("LOCK: already locked, 'L' ignored"),
        Some(RemoteCommand::Disarm) => drop_command(ctx, "Locked"),
        None => {}
    }

    match ctx.key {
        Some(key) if is_entry_key(key) => begin_entry(ctx, key, LockState::Locked),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNLOCKED
// ═══════════════════════════════════════════════════════════════════════════

fn unlocked_enter(ctx: &mut LockContext) {
    ctx.pin.clear();
    ctx.is_locked = false;
    ctx.out.position = Some(LockPosition::Unlocked);
    ctx.out.indicator = Some(false);
    ctx.show_status();
    ctx.assert_signal(SignalCode::Unlocked);
    info!(
        "LOCK: bolt released, auto-lock in {}ms once the door is closed",
        ctx.config.auto_lock_ms
    );
}

fn unlocked_update(ctx: &mut LockContext) -> Option<LockState> {
    match ctx.command {
        Some(RemoteCommand::Lock) => {
            info!("LOCK: remote lock");
            return Some(LockState::Locked);
        }
        Some(RemoteCommand::Unlock) => debug!("LOCK: already unlocked, 'U' ignored"),
        Some(RemoteCommand::Disarm) => drop_command(ctx, "Unlocked"),
        None => {}
    }

    if let Some(key) = ctx.key {
        if is_entry_key(key) {
            return begin_entry(ctx, key, LockState::Unlocked);
        }
    }

    // The timer is not restarted while the door stays open: the lock
    // engages on the first tick the sensor reads closed.
    if ctx.in_state_for(ctx.config.auto_lock_ms) && ctx.door_closed {
        info!("LOCK: auto-lock");
        return Some(LockState::Locked);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAITING_PIN
// ═══════════════════════════════════════════════════════════════════════════

fn awaiting_pin_enter(ctx: &mut LockContext) {
    ctx.show_pin_entry();
}

fn awaiting_pin_exit(ctx: &mut LockContext) {
    ctx.pin.clear();
}

fn awaiting_pin_update(ctx: &mut LockContext) -> Option<LockState> {
    drop_command(ctx, "AwaitingPin");

    if let Some(key) = ctx.key {
        ctx.state_since.restart(ctx.now_ms);

        match key {
            SUBMIT_KEY => return Some(submit_pin(ctx)),
            CANCEL_KEY => {
                info!("LOCK: PIN entry cancelled");
                return Some(LockState::Locked);
            }
            k if is_entry_key(k) => {
                ctx.pin.push(k);
                ctx.show_pin_entry();
            }
            other => debug!("LOCK: key {:?} ignored during PIN entry", other),
        }
    }

    if ctx.in_state_for(ctx.config.pin_timeout_ms) {
        info!("LOCK: PIN entry timed out");
        let resume = ctx.entry_from;
        return Some(ctx.flash_message("Timeout!", resume));
    }

    None
}

fn submit_pin(ctx: &mut LockContext) -> LockState {
    if ctx.pin == ctx.config.operator_pin.as_str() {
        ctx.beep(Tone::Confirm);
        if ctx.is_locked {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    } else if ctx.pin == ctx.config.admin_code.as_str() {
        info!("LOCK: admin code accepted");
        LockState::AdminMode
    } else {
        warn!("LOCK: wrong PIN ({} digits)", ctx.pin.len());
        ctx.beep(Tone::Error);
        ctx.out.pin_rejected = true;
        ctx.flash_message("Wrong PIN!", LockState::Locked)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ADMIN_MODE: registration window, input ignored
// ═══════════════════════════════════════════════════════════════════════════

fn admin_enter(ctx: &mut LockContext) {
    ctx.show("Reg. Mode ON", "");
    ctx.beep(Tone::AdminChime);
    ctx.assert_signal(SignalCode::Registration);
    info!("LOCK: registration mode for {}ms", ctx.config.admin_dwell_ms);
}

fn admin_update(ctx: &mut LockContext) -> Option<LockState> {
    drop_command(ctx, "AdminMode");

    if ctx.in_state_for(ctx.config.admin_dwell_ms) {
        return Some(LockState::Locked);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SHOWING_MESSAGE
// ═══════════════════════════════════════════════════════════════════════════

fn message_enter(ctx: &mut LockContext) {
    let text = ctx.message.map_or("", |m| m.text);
    ctx.show(text, "");
}

fn message_exit(ctx: &mut LockContext) {
    ctx.message = None;
}

fn message_update(ctx: &mut LockContext) -> Option<LockState> {
    drop_command(ctx, "ShowingMessage");

    let Some(msg) = ctx.message else {
        warn!("LOCK: message state without a message, locking");
        return Some(LockState::Locked);
    };

    if ctx.in_state_for(msg.duration_ms) {
        return Some(msg.resume);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARM: siren until disarmed over serial
// ═══════════════════════════════════════════════════════════════════════════

fn alarm_enter(ctx: &mut LockContext) {
    ctx.show("!!! TAMPER !!!", "");
    ctx.assert_signal(SignalCode::Tamper);
    warn!("LOCK: tamper alarm raised");
}

fn alarm_exit(_ctx: &mut LockContext) {
    info!("LOCK: alarm disarmed");
}

fn alarm_update(ctx: &mut LockContext) -> Option<LockState> {
    if ctx.command == Some(RemoteCommand::Disarm) {
        return Some(LockState::Locked);
    }
    drop_command(ctx, "Alarm");

    ctx.beep(Tone::AlarmPulse);
    ctx.assert_signal(SignalCode::Tamper);
    None
}
