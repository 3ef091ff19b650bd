//! Connectivity bridge flows against `MockBridgeHw` and the in-memory
//! remote store.
//!
//! The rig ticks every 100 ms (the default bridge tick interval).

use serde_json::json;
use smartlock::adapters::remote_store::SessionMode;
use smartlock::app::commands::RemoteCommand;
use smartlock::app::events::AppEvent;
use smartlock::app::ports::StatusField;
use smartlock::bridge::ConnectivityState;
use smartlock::protocol::SignalCode;

use crate::mock_hw::{BridgeRig, MockBridgeHw};

fn changed(from: ConnectivityState, to: ConnectivityState) -> AppEvent {
    AppEvent::LinkStateChanged { from, to }
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn starts_joining_and_tells_the_lock() {
    let rig = BridgeRig::new();
    assert_eq!(rig.bridge.state(), ConnectivityState::JoiningNetwork);
    assert_eq!(rig.hw.tx_text(), "WIFI_DISCONNECTED\n");
    assert_eq!(
        rig.sink.events,
        [AppEvent::BridgeStarted(ConnectivityState::JoiningNetwork)]
    );
}

#[test]
fn comes_online_and_publishes_presence() {
    let rig = BridgeRig::online();

    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);
    assert_eq!(rig.hw.tx_text(), "WIFI_DISCONNECTED\nWIFI_CONNECTED\n");
    assert_eq!(rig.store.session_starts(), 1);
    assert_eq!(rig.store.field(StatusField::IsOnline), Some(&json!(true)));
    assert_eq!(
        rig.store.field(StatusField::LastSeen),
        Some(&json!(1_700_000_000u64))
    );
    assert!(rig.sink.contains(&changed(
        ConnectivityState::JoiningNetwork,
        ConnectivityState::EstablishingSession
    )));
    assert!(rig.sink.contains(&changed(
        ConnectivityState::EstablishingSession,
        ConnectivityState::Operational
    )));
}

#[test]
fn last_seen_skipped_without_wall_clock() {
    let mut hw = MockBridgeHw::new();
    hw.unix = None;
    let mut rig = BridgeRig::with(hw, SessionMode::Immediate);
    rig.tick();
    rig.tick();

    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);
    assert_eq!(rig.store.field(StatusField::IsOnline), Some(&json!(true)));
    assert_eq!(rig.store.field(StatusField::LastSeen), None);
}

#[test]
fn failed_join_backs_off_then_retries() {
    let mut hw = MockBridgeHw::new();
    hw.join_results.push_back(false);
    let mut rig = BridgeRig::with(hw, SessionMode::Immediate);

    rig.tick();
    let failed_at = rig.now();
    assert_eq!(rig.bridge.state(), ConnectivityState::Disconnected);
    assert_eq!(
        rig.hw.tx_text(),
        "WIFI_DISCONNECTED\nWIFI_DISCONNECTED\n",
        "lock is told again on entering Disconnected"
    );

    rig.run_until(failed_at + 10_000 - 100);
    assert_eq!(rig.bridge.state(), ConnectivityState::Disconnected);
    assert_eq!(rig.hw.join_calls, 1, "no join during backoff");

    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::JoiningNetwork);
    rig.tick();
    assert_eq!(rig.hw.join_calls, 2);
    assert_eq!(rig.bridge.state(), ConnectivityState::EstablishingSession);
}

#[test]
fn session_timeout_falls_back_to_disconnected() {
    let mut rig = BridgeRig::with(MockBridgeHw::new(), SessionMode::Manual);
    rig.tick();
    let started_at = rig.now();
    assert_eq!(rig.bridge.state(), ConnectivityState::EstablishingSession);

    rig.run_until(started_at + 5_000 - 100);
    assert_eq!(rig.bridge.state(), ConnectivityState::EstablishingSession);
    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::Disconnected);
    assert_eq!(rig.store.field(StatusField::IsOnline), None, "store never reachable");
}

#[test]
fn late_session_is_picked_up() {
    let mut rig = BridgeRig::with(MockBridgeHw::new(), SessionMode::Manual);
    rig.tick();
    rig.run_for(1_000);
    rig.store.complete_session();
    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);
}

// ── Mailbox ───────────────────────────────────────────────────

#[test]
fn forwards_commands_and_clears_mailbox() {
    let mut rig = BridgeRig::online();
    rig.hw.take_tx();

    rig.store.push_command("unlock");
    rig.tick();
    assert_eq!(rig.hw.take_tx(), b"U");
    assert_eq!(rig.store.command(), Some(""));
    assert!(rig.sink.contains(&AppEvent::CommandForwarded(RemoteCommand::Unlock)));

    rig.store.push_command("lock");
    rig.tick();
    assert_eq!(rig.hw.take_tx(), b"L");

    rig.store.push_command("disarm");
    rig.tick();
    assert_eq!(rig.hw.take_tx(), b"DISARM\n");
    assert_eq!(rig.store.command(), Some(""));
}

#[test]
fn command_left_while_offline_is_forwarded_once() {
    let mut hw = MockBridgeHw::new();
    hw.join_results.push_back(false);
    let mut rig = BridgeRig::with(hw, SessionMode::Immediate);
    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::Disconnected);

    rig.store.push_command("lock");
    rig.run_for(10_000);
    rig.run_for(1_000);
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);

    rig.run_for(2_000);
    let sent = rig.hw.tx.iter().filter(|&&b| b == b'L').count();
    assert_eq!(sent, 1);
    assert_eq!(rig.store.command(), Some(""));
}

#[test]
fn empty_mailbox_sends_nothing() {
    let mut rig = BridgeRig::online();
    rig.hw.take_tx();

    rig.store.push_command("");
    rig.run_for(500);
    rig.store.push_command("null");
    rig.run_for(500);
    assert!(rig.hw.tx.is_empty());
    assert_eq!(rig.store.command(), Some("null"), "empty values are left alone");
}

#[test]
fn unknown_command_is_cleared_without_forwarding() {
    let mut rig = BridgeRig::online();
    rig.hw.take_tx();

    rig.store.push_command("open sesame");
    rig.tick();
    assert!(rig.hw.tx.is_empty());
    assert_eq!(rig.store.command(), Some(""));
}

#[test]
fn failed_read_retries_next_tick() {
    let mut rig = BridgeRig::online();
    rig.hw.take_tx();

    rig.store.push_command("lock");
    rig.store.fail_reads(1);
    rig.tick();
    assert!(rig.hw.tx.is_empty());
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);

    rig.tick();
    assert_eq!(rig.hw.take_tx(), b"L");
}

#[test]
fn failed_clear_redelivers_command() {
    let mut rig = BridgeRig::online();
    rig.hw.take_tx();

    rig.store.push_command("lock");
    rig.store.fail_writes(1);
    rig.tick();
    assert_eq!(rig.store.command(), Some("lock"));
    rig.tick();
    assert_eq!(rig.hw.take_tx(), b"LL");
    assert_eq!(rig.store.command(), Some(""));
}

// ── Signal lines ──────────────────────────────────────────────

#[test]
fn lock_status_codes_are_published_on_edges() {
    let mut rig = BridgeRig::online();

    rig.signal(0b001);
    assert_eq!(rig.store.field(StatusField::IsLocked), Some(&json!(true)));
    assert!(rig.sink.contains(&AppEvent::SignalObserved(SignalCode::Locked)));

    rig.run_for(1_000);
    assert_eq!(rig.store.writes_to(StatusField::IsLocked), 1, "level held, no edge");

    rig.signal(0b000);
    rig.signal(0b011);
    assert_eq!(rig.store.field(StatusField::IsLocked), Some(&json!(false)));

    rig.signal(0b000);
    rig.signal(0b001);
    assert_eq!(rig.store.writes_to(StatusField::IsLocked), 3);
}

#[test]
fn tamper_alert_clears_after_window() {
    let mut rig = BridgeRig::online();
    rig.signal(0b010);
    let armed_at = rig.now();

    assert_eq!(rig.store.field(StatusField::Alert), Some(&json!("knock")));
    assert!(rig.bridge.tamper_alert_active());

    rig.run_until(armed_at + 5_000 - 100);
    assert_eq!(rig.store.field(StatusField::Alert), Some(&json!("knock")));
    rig.tick();
    assert_eq!(rig.store.field(StatusField::Alert), Some(&json!("none")));
    assert!(!rig.bridge.tamper_alert_active());
}

#[test]
fn repeated_tamper_keeps_first_deadline() {
    let mut rig = BridgeRig::online();
    rig.signal(0b010);
    let armed_at = rig.now();

    rig.run_for(2_000);
    rig.signal(0b000);
    rig.signal(0b010);
    assert_eq!(rig.store.writes_to(StatusField::Alert), 1);

    rig.run_until(armed_at + 5_000);
    assert_eq!(rig.store.field(StatusField::Alert), Some(&json!("none")));
}

#[test]
fn registration_mode_times_out() {
    let mut rig = BridgeRig::online();
    rig.signal(0b100);
    let armed_at = rig.now();

    assert_eq!(rig.store.field(StatusField::Mode), Some(&json!("registration")));
    assert!(rig.bridge.registration_active());

    rig.run_until(armed_at + 60_000 - 100);
    assert!(rig.bridge.registration_active());
    rig.tick();
    assert_eq!(rig.store.field(StatusField::Mode), Some(&json!("normal")));
    assert!(!rig.bridge.registration_active());
}

#[test]
fn idle_samples_have_no_effect() {
    let mut rig = BridgeRig::online();
    rig.hw.take_tx();
    let writes = rig.store.history().len();
    let events = rig.sink.events.len();

    for _ in 0..50 {
        rig.signal(0b000);
    }
    assert_eq!(rig.store.history().len(), writes);
    assert_eq!(rig.sink.events.len(), events);
    assert!(rig.hw.tx.is_empty());
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);
}

#[test]
fn unrecognised_code_is_not_published() {
    let mut rig = BridgeRig::online();
    let writes = rig.store.history().len();
    rig.signal(0b101);
    rig.signal(0b110);
    assert_eq!(rig.store.history().len(), writes);
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);
}

#[test]
fn factory_reset_marks_offline_erases_credentials_and_rejoins() {
    let mut rig = BridgeRig::online();
    rig.signal(0b111);

    assert_eq!(rig.hw.resets, 1);
    assert!(rig.sink.contains(&AppEvent::FactoryReset));
    assert_eq!(rig.store.field(StatusField::IsOnline), Some(&json!(false)));
    assert_eq!(rig.bridge.state(), ConnectivityState::JoiningNetwork);

    rig.tick();
    assert_eq!(rig.hw.join_calls, 2);
}

// ── Connection loss ───────────────────────────────────────────

#[test]
fn link_loss_marks_offline() {
    let mut rig = BridgeRig::online();
    rig.signal(0b010);
    rig.hw.take_tx();

    rig.hw.link_up = false;
    rig.tick();

    assert_eq!(rig.bridge.state(), ConnectivityState::Disconnected);
    assert_eq!(rig.store.field(StatusField::IsOnline), Some(&json!(false)));
    assert_eq!(rig.hw.tx_text(), "WIFI_DISCONNECTED\n");
    assert!(!rig.bridge.tamper_alert_active(), "temporary modes are dropped");
}

#[test]
fn session_loss_marks_disconnected() {
    let mut rig = BridgeRig::online();
    rig.store.drop_session();
    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::Disconnected);
}

#[test]
fn held_code_is_republished_after_reconnect() {
    let mut rig = BridgeRig::online();
    rig.signal(0b001);
    assert_eq!(rig.store.writes_to(StatusField::IsLocked), 1);

    rig.hw.link_up = false;
    rig.tick();
    rig.run_for(10_000);
    assert_eq!(rig.bridge.state(), ConnectivityState::JoiningNetwork);
    rig.tick();
    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);

    rig.tick();
    assert_eq!(rig.store.writes_to(StatusField::IsLocked), 2);
}

#[test]
fn lock_chatter_is_ignored() {
    let mut rig = BridgeRig::online();
    rig.hw.rx.extend(b"BOOT OK\n".iter().copied());
    rig.tick();
    assert_eq!(rig.bridge.state(), ConnectivityState::Operational);
    assert_eq!(rig.bridge.tick_count(), 3);
}
