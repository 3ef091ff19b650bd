//! Bridge state handler functions and the static state table.
//!
//! ```text
//!  JOINING_NETWORK      entry: WIFI_DISCONNECTED → lock
//!  ESTABLISHING_SESSION entry: WIFI_CONNECTED → lock, start session
//!  OPERATIONAL          entry: isOnline = true, lastSeen = now
//!                       tick:  mailbox → signal edge → latch expiry
//!                       exit:  drop latches and edge memory
//!  DISCONNECTED         entry: WIFI_DISCONNECTED → lock, isOnline = false
//! ```

use log::{debug, info, warn};

use super::context::{BridgeContext, Mailbox};
use super::ConnectivityState;
use crate::app::ports::{
    FieldValue, StatusField, ALERT_KNOCK, ALERT_NONE, MODE_NORMAL, MODE_REGISTRATION,
};
use crate::error::ProtocolError;
use crate::fsm::StateDescriptor;
use crate::protocol::{SignalCode, TextToken};

// ═══════════════════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════════════════

/// The bridge state table, indexed by `ConnectivityState as usize`.
pub static BRIDGE_TABLE: [StateDescriptor<ConnectivityState, BridgeContext>;
    ConnectivityState::COUNT] = [
    // Index 0: JoiningNetwork
    StateDescriptor {
        id: ConnectivityState::JoiningNetwork,
        name: "JoiningNetwork",
        on_enter: Some(joining_enter),
        on_exit: None,
        on_update: joining_update,
    },
    // Index 1: EstablishingSession
    StateDescriptor {
        id: ConnectivityState::EstablishingSession,
        name: "EstablishingSession",
        on_enter: Some(session_enter),
        on_exit: None,
        on_update: session_update,
    },
    // Index 2: Operational
    StateDescriptor {
        id: ConnectivityState::Operational,
        name: "Operational",
        on_enter: Some(operational_enter),
        on_exit: Some(operational_exit),
        on_update: operational_update,
    },
    // Index 3: Disconnected
    StateDescriptor {
        id: ConnectivityState::Disconnected,
        name: "Disconnected",
        on_enter: Some(disconnected_enter),
        on_exit: None,
        on_update: disconnected_update,
    },
];

// ═══════════════════════════════════════════════════════════════════════════
//  JOINING_NETWORK: the one blocking step (join or captive portal)
// ═══════════════════════════════════════════════════════════════════════════

fn joining_enter(ctx: &mut BridgeContext) {
    ctx.send(TextToken::WifiDisconnected.line_bytes());
    info!(
        "BRIDGE: joining network (portal '{}' up to {}s)",
        ctx.config.provision_ap_ssid, ctx.config.provision_timeout_secs
    );
}

fn joining_update(ctx: &mut BridgeContext) -> Option<ConnectivityState> {
    match ctx.joined.take() {
        Some(true) => Some(ConnectivityState::EstablishingSession),
        Some(false) => {
            warn!("BRIDGE: network join failed");
            Some(ConnectivityState::Disconnected)
        }
        None => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ESTABLISHING_SESSION
// ═══════════════════════════════════════════════════════════════════════════

fn session_enter(ctx: &mut BridgeContext) {
    ctx.send(TextToken::WifiConnected.line_bytes());
    ctx.out.start_session = true;
}

fn session_update(ctx: &mut BridgeContext) -> Option<ConnectivityState> {
    if ctx.session_ready {
        return Some(ConnectivityState::Operational);
    }
    if ctx.in_state_for(ctx.config.session_timeout_ms) {
        warn!(
            "BRIDGE: store session not ready after {}ms",
            ctx.config.session_timeout_ms
        );
        return Some(ConnectivityState::Disconnected);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPERATIONAL
// ═══════════════════════════════════════════════════════════════════════════

fn operational_enter(ctx: &mut BridgeContext) {
    ctx.publish(StatusField::IsOnline, FieldValue::Bool(true));
    match ctx.unix_time {
        Some(secs) => ctx.publish(StatusField::LastSeen, FieldValue::UnixSeconds(secs)),
        None => warn!("BRIDGE: wall clock not synced, lastSeen not published"),
    }
    info!("OK: System online and operational");
}

fn operational_exit(ctx: &mut BridgeContext) {
    ctx.drop_session_state();
}

fn operational_update(ctx: &mut BridgeContext) -> Option<ConnectivityState> {
    if !ctx.link_up || !ctx.session_ready {
        warn!(
            "BRIDGE: connection lost (link={}, session={})",
            ctx.link_up, ctx.session_ready
        );
        return Some(ConnectivityState::Disconnected);
    }

    // 1. Mailbox
    handle_mailbox(ctx);

    // 2. Signal line, edge-triggered
    let code = SignalCode::from_bits(ctx.signal_bits);
    if code != ctx.last_signal {
        ctx.last_signal = code;
        if handle_signal(ctx, code) {
            return Some(ConnectivityState::JoiningNetwork);
        }
    }

    // 3. Temporary modes
    if ctx.registration.expire(ctx.now_ms) {
        ctx.publish(StatusField::Mode, FieldValue::Text(MODE_NORMAL));
        info!("OK: Registration mode timed out");
    }
    if ctx.tamper_alert.expire(ctx.now_ms) {
        ctx.publish(StatusField::Alert, FieldValue::Text(ALERT_NONE));
        info!("OK: Tamper alert cleared");
    }

    None
}

fn handle_mailbox(ctx: &mut BridgeContext) {
    match ctx.mailbox.take() {
        Some(Mailbox::Command(cmd)) => {
            ctx.send(cmd.serial_bytes());
            ctx.out.forwarded = Some(cmd);
            ctx.out.clear_mailbox = true;
            info!("OK: Forwarded '{}' to lock", cmd.as_str());
        }
        Some(Mailbox::Unrecognized(raw)) => {
            warn!("BRIDGE: {} {:?}, clearing", ProtocolError::UnknownCommand, raw);
            ctx.out.clear_mailbox = true;
        }
        Some(Mailbox::Failed(e)) => warn!("BRIDGE: mailbox read failed: {}", e),
        Some(Mailbox::Empty) | None => {}
    }
}

/// React to a new signal code.  Returns `true` when the bridge must
/// restart its join cycle.
fn handle_signal(ctx: &mut BridgeContext, code: SignalCode) -> bool {
    if !code.is_idle() {
        ctx.out.observed = Some(code);
    }

    match code {
        SignalCode::Idle => {}
        SignalCode::Locked => ctx.publish(StatusField::IsLocked, FieldValue::Bool(true)),
        SignalCode::Unlocked => ctx.publish(StatusField::IsLocked, FieldValue::Bool(false)),
        SignalCode::Tamper => {
            if ctx.tamper_alert.arm(ctx.now_ms) {
                ctx.publish(StatusField::Alert, FieldValue::Text(ALERT_KNOCK));
            } else {
                debug!("BRIDGE: tamper alert already active");
            }
        }
        SignalCode::Registration => {
            if ctx.registration.arm(ctx.now_ms) {
                ctx.publish(StatusField::Mode, FieldValue::Text(MODE_REGISTRATION));
            } else {
                debug!("BRIDGE: registration mode already active");
            }
        }
        SignalCode::FactoryReset => {
            warn!("BRIDGE: factory reset requested, erasing network credentials");
            // Last write while the store is still reachable.
            ctx.publish(StatusField::IsOnline, FieldValue::Bool(false));
            ctx.out.reset_credentials = true;
            return true;
        }
        SignalCode::Unrecognized(bits) => {
            warn!("BRIDGE: {}", ProtocolError::UnrecognizedSignal(bits));
        }
    }
    false
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISCONNECTED: fixed backoff before rejoining
// ═══════════════════════════════════════════════════════════════════════════

fn disconnected_enter(ctx: &mut BridgeContext) {
    ctx.send(TextToken::WifiDisconnected.line_bytes());
    ctx.publish(StatusField::IsOnline, FieldValue::Bool(false));
    info!(
        "BRIDGE: retrying in {}ms",
        ctx.config.reconnect_backoff_ms
    );
}

fn disconnected_update(ctx: &mut BridgeContext) -> Option<ConnectivityState> {
    if ctx.in_state_for(ctx.config.reconnect_backoff_ms) {
        return Some(ConnectivityState::JoiningNetwork);
    }
    None
}
