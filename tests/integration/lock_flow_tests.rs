//! Lock controller flows against `MockLockHw`.
//!
//! The rig ticks every 20 ms (the default lock tick interval); all
//! timeouts below use the default `LockConfig`.

use smartlock::app::events::AppEvent;
use smartlock::app::ports::{LockPosition, Tone};
use smartlock::config::LockConfig;
use smartlock::lock::{LinkStatus, LockState};
use smartlock::protocol::SignalCode;

use crate::mock_hw::{LockRig, MockLockHw};

fn changed(from: LockState, to: LockState) -> AppEvent {
    AppEvent::LockStateChanged { from, to }
}

// ── Power-on ──────────────────────────────────────────────────

#[test]
fn boots_locked_with_door_closed() {
    let rig = LockRig::new();
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert!(rig.lock.is_locked());
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
    assert_eq!(rig.hw.indicator(), Some(true));
    assert_eq!(rig.hw.screen(), Some(("Status: LOCKED", "WiFi: Unknown")));
    assert_eq!(rig.hw.signals(), [SignalCode::Locked]);
    assert_eq!(rig.sink.events, [AppEvent::LockStarted(LockState::Locked)]);
}

#[test]
fn boots_unlocked_with_door_open() {
    let mut hw = MockLockHw::new();
    hw.door_closed = false;
    let rig = LockRig::with(LockConfig::default(), hw);
    assert_eq!(rig.lock.state(), LockState::Unlocked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Unlocked));
    assert_eq!(rig.hw.indicator(), Some(false));
    assert_eq!(rig.hw.signals(), [SignalCode::Unlocked]);
}

// ── PIN entry ─────────────────────────────────────────────────

#[test]
fn correct_pin_unlocks() {
    let mut rig = LockRig::new();
    rig.press("1234#");

    assert_eq!(rig.lock.state(), LockState::Unlocked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Unlocked));
    assert_eq!(rig.hw.tones(), [Tone::Confirm]);
    assert!(rig.sink.contains(&changed(LockState::Locked, LockState::AwaitingPin)));
    assert!(rig.sink.contains(&changed(LockState::AwaitingPin, LockState::Unlocked)));
    assert_eq!(rig.lock.pin_len(), 0, "PIN buffer must be wiped on exit");
}

#[test]
fn correct_pin_while_unlocked_locks() {
    let mut rig = LockRig::new();
    rig.press("1234#");
    rig.press("1234#");

    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
    assert_eq!(rig.hw.tones(), [Tone::Confirm, Tone::Confirm]);
}

#[test]
fn pin_entry_screen_is_masked() {
    let mut rig = LockRig::new();
    rig.press("12");
    assert_eq!(rig.lock.state(), LockState::AwaitingPin);
    assert_eq!(rig.lock.pin_len(), 2);
    assert_eq!(rig.hw.screen(), Some(("Enter PIN:", "**")));
}

#[test]
fn non_entry_keys_do_nothing_when_idle() {
    let mut rig = LockRig::new();
    rig.press("#*");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.lock.pin_len(), 0);
}

#[test]
fn letter_keys_start_entry() {
    let mut rig = LockRig::new();
    rig.press("B");
    assert_eq!(rig.lock.state(), LockState::AwaitingPin);
    assert_eq!(rig.lock.pin_len(), 1);
}

#[test]
fn wrong_pin_shows_message_then_locks() {
    let mut rig = LockRig::new();
    rig.press("5555#");
    let shown_at = rig.now;

    assert_eq!(rig.lock.state(), LockState::ShowingMessage);
    assert_eq!(rig.hw.line1(), "Wrong PIN!");
    assert_eq!(rig.hw.tones(), [Tone::Error]);
    assert_eq!(rig.sink.count(&AppEvent::PinRejected), 1);

    rig.run_until(shown_at + 2_000 - 20);
    assert_eq!(rig.lock.state(), LockState::ShowingMessage);
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Locked);
}

#[test]
fn wrong_pin_while_unlocked_relocks() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    rig.press("0000#");
    rig.run_for(2_000);
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
}

#[test]
fn keys_are_ignored_while_message_is_shown() {
    let mut rig = LockRig::new();
    rig.press("5555#");
    rig.press("1234#");
    assert_eq!(rig.lock.state(), LockState::ShowingMessage);
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
}

#[test]
fn cancel_key_returns_to_locked() {
    let mut rig = LockRig::new();
    rig.press("12*");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.lock.pin_len(), 0);
}

#[test]
fn cancel_from_unlocked_locks() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    rig.press("7*");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
}

#[test]
fn pin_timeout_returns_to_start_state() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    rig.press("1");
    let last_key = rig.now;

    rig.run_until(last_key + 10_000 - 20);
    assert_eq!(rig.lock.state(), LockState::AwaitingPin);
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::ShowingMessage);
    assert_eq!(rig.hw.line1(), "Timeout!");

    rig.run_for(2_000);
    assert_eq!(rig.lock.state(), LockState::Unlocked);
}

#[test]
fn every_key_restarts_pin_timeout() {
    let mut rig = LockRig::new();
    rig.press("1");
    rig.run_for(9_000);
    rig.press("2");
    rig.run_for(9_000);
    assert_eq!(rig.lock.state(), LockState::AwaitingPin);
    assert_eq!(rig.lock.pin_len(), 2);
}

// ── Admin code ────────────────────────────────────────────────

#[test]
fn admin_code_opens_registration_window() {
    let mut rig = LockRig::new();
    rig.press("9999#");
    let entered = rig.now;

    assert_eq!(rig.lock.state(), LockState::AdminMode);
    assert_eq!(rig.hw.line1(), "Reg. Mode ON");
    assert!(rig.hw.tones().contains(&Tone::AdminChime));
    assert!(rig.hw.signals().contains(&SignalCode::Registration));

    rig.press("1234#");
    assert_eq!(rig.lock.state(), LockState::AdminMode, "keys are ignored");
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));

    rig.run_until(entered + 5_000 - 20);
    assert_eq!(rig.lock.state(), LockState::AdminMode);
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Locked);
}

#[test]
fn admin_mode_ends_locked_even_from_unlocked() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    rig.press("9999#");
    assert_eq!(rig.lock.state(), LockState::AdminMode);
    rig.run_for(5_000);
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
}

// ── Auto-lock ─────────────────────────────────────────────────

#[test]
fn auto_lock_after_timeout_with_door_closed() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    let unlocked_at = rig.now;

    rig.run_until(unlocked_at + 10_000 - 20);
    assert_eq!(rig.lock.state(), LockState::Unlocked);
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert!(rig.sink.contains(&changed(LockState::Unlocked, LockState::Locked)));
}

#[test]
fn auto_lock_waits_for_door_to_close() {
    let mut rig = LockRig::new();
    rig.hw.door_closed = false;
    rig.serial(b"U");

    rig.run_for(20_000);
    assert_eq!(rig.lock.state(), LockState::Unlocked);

    rig.hw.door_closed = true;
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Locked);
}

// ── Remote commands over serial ───────────────────────────────

#[test]
fn control_bytes_move_the_bolt() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    assert_eq!(rig.lock.state(), LockState::Unlocked);
    assert_eq!(rig.hw.indicator(), Some(false));

    rig.serial(b"L");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.indicator(), Some(true));
}

#[test]
fn redundant_control_byte_is_ignored() {
    let mut rig = LockRig::new();
    let moves = rig.hw.moves();
    rig.serial(b"L");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.moves(), moves, "no actuator call for a no-op");
}

#[test]
fn control_bytes_are_dropped_during_pin_entry() {
    let mut rig = LockRig::new();
    rig.press("1");
    rig.serial(b"U");
    assert_eq!(rig.lock.state(), LockState::AwaitingPin);
    assert_eq!(rig.lock.pin_len(), 1);
}

#[test]
fn disarm_outside_alarm_is_dropped() {
    let mut rig = LockRig::new();
    rig.serial(b"DISARM\n");
    assert_eq!(rig.lock.state(), LockState::Locked);
}

#[test]
fn unknown_lines_are_ignored() {
    let mut rig = LockRig::new();
    rig.serial(b"PING\n");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.lock.link_status(), LinkStatus::Unknown);
}

// ── Link status tokens ────────────────────────────────────────

#[test]
fn link_tokens_update_status_screen() {
    let mut rig = LockRig::new();
    rig.serial(b"WIFI_CONNECTED\n");
    assert_eq!(rig.lock.link_status(), LinkStatus::Connected);
    assert_eq!(rig.hw.screen(), Some(("Status: LOCKED", "WiFi: Connected")));

    rig.serial(b"WIFI_DISCONNECTED\r\n");
    assert_eq!(rig.lock.link_status(), LinkStatus::Disconnected);
    assert_eq!(rig.hw.line2(), "WiFi: Disconnected");
}

#[test]
fn link_token_does_not_clobber_pin_screen() {
    let mut rig = LockRig::new();
    rig.press("1");
    rig.serial(b"WIFI_CONNECTED\n");
    assert_eq!(rig.lock.link_status(), LinkStatus::Connected);
    assert_eq!(rig.hw.line1(), "Enter PIN:");
}

#[test]
fn token_split_across_ticks_is_reassembled() {
    let mut rig = LockRig::new();
    rig.serial(b"WIFI_CON");
    assert_eq!(rig.lock.link_status(), LinkStatus::Unknown);
    rig.serial(b"NECTED\n");
    assert_eq!(rig.lock.link_status(), LinkStatus::Connected);
}

// ── Tamper ────────────────────────────────────────────────────

#[test]
fn tamper_raises_alarm() {
    let mut rig = LockRig::new();
    rig.tamper.raise();
    rig.tick();

    assert_eq!(rig.lock.state(), LockState::Alarm);
    assert_eq!(rig.hw.line1(), "!!! TAMPER !!!");
    assert!(rig.sink.contains(&AppEvent::TamperDetected));
    assert!(rig.sink.contains(&changed(LockState::Locked, LockState::Alarm)));
    assert_eq!(rig.lock.signal(), SignalCode::Tamper);
}

#[test]
fn alarm_sounds_every_tick_and_holds_signal() {
    let mut rig = LockRig::new();
    rig.lock.on_tamper_edge();
    rig.tick();
    rig.run_for(1_000);

    let pulses = rig.hw.tones().iter().filter(|t| **t == Tone::AlarmPulse).count();
    assert_eq!(pulses, 51);
    assert_eq!(rig.lock.signal(), SignalCode::Tamper, "alarm keeps re-asserting");
}

#[test]
fn repeated_tamper_in_alarm_is_ignored() {
    let mut rig = LockRig::new();
    rig.tamper.raise();
    rig.tick();
    rig.tamper.raise();
    rig.tick();
    assert_eq!(rig.sink.count(&AppEvent::TamperDetected), 1);
    assert_eq!(rig.lock.state(), LockState::Alarm);
}

#[test]
fn only_disarm_leaves_alarm() {
    let mut rig = LockRig::new();
    rig.tamper.raise();
    rig.tick();

    rig.serial(b"U");
    rig.press("1234#");
    rig.run_for(30_000);
    assert_eq!(rig.lock.state(), LockState::Alarm);

    rig.serial(b"DISARM\n");
    assert_eq!(rig.lock.state(), LockState::Locked);
    assert_eq!(rig.hw.position(), Some(LockPosition::Locked));
    let signals = rig.hw.signals();
    assert_eq!(
        signals[signals.len() - 3..],
        [SignalCode::Tamper, SignalCode::Idle, SignalCode::Locked]
    );
}

#[test]
fn tamper_interrupts_pin_entry() {
    let mut rig = LockRig::new();
    rig.press("12");
    rig.tamper.raise();
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Alarm);
    assert_eq!(rig.lock.pin_len(), 0);
    assert!(rig.sink.contains(&changed(LockState::AwaitingPin, LockState::Alarm)));
}

#[test]
fn tamper_interrupts_admin_mode() {
    let mut rig = LockRig::new();
    rig.press("9999#");
    rig.tamper.raise();
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Alarm);
}

#[test]
fn tamper_interrupts_unlocked() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    assert_eq!(rig.lock.state(), LockState::Unlocked);

    rig.tamper.raise();
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Alarm);
    assert!(rig.sink.contains(&changed(LockState::Unlocked, LockState::Alarm)));
    assert_eq!(rig.lock.signal(), SignalCode::Tamper);
}

#[test]
fn tamper_interrupts_message_and_discards_it() {
    let mut rig = LockRig::new();
    rig.press("5555#");
    assert_eq!(rig.lock.state(), LockState::ShowingMessage);

    rig.tamper.raise();
    rig.tick();
    assert_eq!(rig.lock.state(), LockState::Alarm);
    assert_eq!(rig.hw.line1(), "!!! TAMPER !!!");

    rig.run_for(3_000);
    assert_eq!(rig.lock.state(), LockState::Alarm, "message must not resume");

    rig.serial(b"DISARM\n");
    assert_eq!(rig.lock.state(), LockState::Locked);
}

#[test]
fn disarm_queued_before_tamper_does_not_cancel_alarm() {
    let mut rig = LockRig::new();
    rig.run_for(500);
    rig.hw.clear_calls();

    rig.hw.send(b"DISARM\n");
    rig.tamper.raise();
    rig.tick();

    assert_eq!(rig.lock.state(), LockState::Alarm);
    assert_eq!(rig.hw.signals(), [SignalCode::Tamper]);
    assert_eq!(rig.hw.moves(), 0, "bolt must not be driven again");
    assert!(!rig.sink.contains(&changed(LockState::Alarm, LockState::Locked)));

    rig.run_for(1_000);
    assert_eq!(rig.lock.state(), LockState::Alarm);
}

// ── Signal lines ──────────────────────────────────────────────

#[test]
fn signal_is_held_then_released() {
    let mut rig = LockRig::new();
    rig.run_for(180);
    assert_eq!(rig.hw.signals(), [SignalCode::Locked]);
    rig.tick();
    assert_eq!(rig.hw.signals(), [SignalCode::Locked, SignalCode::Idle]);
    assert_eq!(rig.lock.signal(), SignalCode::Idle);
}

#[test]
fn code_change_passes_through_idle() {
    let mut rig = LockRig::new();
    rig.serial(b"U");
    assert_eq!(
        rig.hw.signals(),
        [SignalCode::Locked, SignalCode::Idle, SignalCode::Unlocked]
    );
}

// ── Housekeeping ──────────────────────────────────────────────

#[test]
fn status_screen_refreshes_periodically() {
    let mut rig = LockRig::new();
    let before = rig.hw.renders();
    rig.run_for(4_000);
    assert_eq!(rig.hw.renders(), before + 2);
}

#[test]
fn lock_never_writes_serial() {
    let mut rig = LockRig::new();
    rig.press("1234#");
    rig.serial(b"L");
    assert!(rig.hw.tx.is_empty());
    assert_eq!(rig.lock.tick_count(), 6);
}
