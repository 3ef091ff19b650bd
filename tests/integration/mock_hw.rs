//! Mock hardware adapters and rigs for integration tests.
//!
//! The mocks record every output call so tests can assert on the full
//! history without touching real GPIO, PWM or UART registers.  Each rig
//! owns a controller plus its mocks and advances a fake millisecond clock
//! by one tick interval per step.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use smartlock::adapters::remote_store::{MemoryRemoteStore, SessionMode};
use smartlock::app::events::AppEvent;
use smartlock::app::ports::{
    ActuatorPort, BuzzerPort, ClockPort, ConnectivityError, DisplayPort, DoorSensorPort,
    EventSink, KeypadPort, LockPosition, NetworkPort, SerialPort, SignalInPort, SignalOutPort,
    Tone,
};
use smartlock::bridge::Bridge;
use smartlock::config::{BridgeConfig, LockConfig};
use smartlock::events::TamperFlag;
use smartlock::lock::LockController;
use smartlock::protocol::SignalCode;

// ── Lock-side call record ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LockCall {
    Move(LockPosition),
    Indicator(bool),
    Render(String, String),
    Beep(Tone),
    Signal(SignalCode),
}

// ── MockLockHw ────────────────────────────────────────────────

pub struct MockLockHw {
    pub calls: Vec<LockCall>,
    pub keys: VecDeque<char>,
    pub door_closed: bool,
    /// Bytes the bridge sent, waiting to be read by the lock.
    pub rx: VecDeque<u8>,
    /// Bytes the lock wrote.
    pub tx: Vec<u8>,
}

#[allow(dead_code)]
impl MockLockHw {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            keys: VecDeque::new(),
            door_closed: true,
            rx: VecDeque::new(),
            tx: Vec::new(),
        }
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Last two lines rendered, if any.
    pub fn screen(&self) -> Option<(&str, &str)> {
        self.calls.iter().rev().find_map(|c| match c {
            LockCall::Render(l1, l2) => Some((l1.as_str(), l2.as_str())),
            _ => None,
        })
    }

    pub fn line1(&self) -> &str {
        self.screen().map_or("", |(l1, _)| l1)
    }

    pub fn line2(&self) -> &str {
        self.screen().map_or("", |(_, l2)| l2)
    }

    pub fn renders(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, LockCall::Render(..)))
            .count()
    }

    pub fn position(&self) -> Option<LockPosition> {
        self.calls.iter().rev().find_map(|c| match c {
            LockCall::Move(p) => Some(*p),
            _ => None,
        })
    }

    pub fn moves(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, LockCall::Move(_)))
            .count()
    }

    pub fn indicator(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            LockCall::Indicator(on) => Some(*on),
            _ => None,
        })
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                LockCall::Beep(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    pub fn signals(&self) -> Vec<SignalCode> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                LockCall::Signal(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockLockHw {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockLockHw {
    fn move_to(&mut self, position: LockPosition) {
        self.calls.push(LockCall::Move(position));
    }

    fn set_indicator(&mut self, on: bool) {
        self.calls.push(LockCall::Indicator(on));
    }
}

impl BuzzerPort for MockLockHw {
    fn beep(&mut self, tone: Tone) {
        self.calls.push(LockCall::Beep(tone));
    }
}

impl DisplayPort for MockLockHw {
    fn render(&mut self, line1: &str, line2: &str) {
        self.calls
            .push(LockCall::Render(line1.to_string(), line2.to_string()));
    }
}

impl KeypadPort for MockLockHw {
    fn next_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }
}

impl DoorSensorPort for MockLockHw {
    fn is_closed(&self) -> bool {
        self.door_closed
    }
}

impl SignalOutPort for MockLockHw {
    fn write_signal(&mut self, code: SignalCode) {
        self.calls.push(LockCall::Signal(code));
    }
}

impl SerialPort for MockLockHw {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }
}

// ── MockBridgeHw ──────────────────────────────────────────────

pub struct MockBridgeHw {
    /// Scripted join outcomes; `join_default` once exhausted.
    pub join_results: VecDeque<bool>,
    pub join_default: bool,
    pub join_calls: u32,
    pub link_up: bool,
    pub signal_bits: u8,
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub now_ms: u32,
    pub unix: Option<u64>,
    pub resets: u32,
}

#[allow(dead_code)]
impl MockBridgeHw {
    pub fn new() -> Self {
        Self {
            join_results: VecDeque::new(),
            join_default: true,
            join_calls: 0,
            link_up: false,
            signal_bits: 0,
            rx: VecDeque::new(),
            tx: Vec::new(),
            now_ms: 0,
            unix: Some(1_700_000_000),
            resets: 0,
        }
    }

    /// Everything written to the lock so far, as text.
    pub fn tx_text(&self) -> String {
        String::from_utf8_lossy(&self.tx).into_owned()
    }

    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }
}

impl Default for MockBridgeHw {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPort for MockBridgeHw {
    fn join_or_provision(&mut self, _timeout_secs: u32) -> bool {
        self.join_calls += 1;
        let joined = self.join_results.pop_front().unwrap_or(self.join_default);
        self.link_up = joined;
        joined
    }

    fn is_connected(&self) -> bool {
        self.link_up
    }

    fn reset_credentials(&mut self) -> Result<(), ConnectivityError> {
        self.resets += 1;
        self.link_up = false;
        Ok(())
    }
}

impl SignalInPort for MockBridgeHw {
    fn sample_signal(&mut self) -> u8 {
        self.signal_bits
    }
}

impl SerialPort for MockBridgeHw {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
    }
}

impl ClockPort for MockBridgeHw {
    fn uptime_ms(&self) -> u32 {
        self.now_ms
    }

    fn unix_time(&self) -> Option<u64> {
        self.unix
    }
}

// ── SimClock ──────────────────────────────────────────────────

/// Shared fake clock, cloned into a board while the test keeps a handle.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    ms: Rc<Cell<u32>>,
    unix: Rc<Cell<Option<u64>>>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn set_ms(&self, ms: u32) {
        self.ms.set(ms);
    }

    pub fn set_unix(&self, secs: Option<u64>) {
        self.unix.set(secs);
    }
}

impl ClockPort for SimClock {
    fn uptime_ms(&self) -> u32 {
        self.ms.get()
    }

    fn unix_time(&self) -> Option<u64> {
        self.unix.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, wanted: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }

    pub fn contains(&self, wanted: &AppEvent) -> bool {
        self.count(wanted) > 0
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// A fresh tamper flag with `'static` lifetime, one per test.
pub fn leak_flag() -> &'static TamperFlag {
    Box::leak(Box::new(TamperFlag::new()))
}

// ── LockRig ───────────────────────────────────────────────────

pub struct LockRig {
    pub lock: LockController,
    pub hw: MockLockHw,
    pub sink: RecordingSink,
    pub tamper: &'static TamperFlag,
    pub now: u32,
    step_ms: u32,
}

#[allow(dead_code)]
impl LockRig {
    /// Default config, door closed, started at t = 0.
    pub fn new() -> Self {
        Self::with(LockConfig::default(), MockLockHw::new())
    }

    pub fn with(config: LockConfig, mut hw: MockLockHw) -> Self {
        let tamper = leak_flag();
        let step_ms = config.tick_interval_ms;
        let mut lock = LockController::new(config, tamper);
        let mut sink = RecordingSink::default();
        lock.start(0, &mut hw, &mut sink);
        Self {
            lock,
            hw,
            sink,
            tamper,
            now: 0,
            step_ms,
        }
    }

    pub fn tick(&mut self) {
        self.now = self.now.wrapping_add(self.step_ms);
        self.lock.tick(self.now, &mut self.hw, &mut self.sink);
    }

    /// Tick until `ms` more milliseconds have passed.
    pub fn run_for(&mut self, ms: u32) {
        for _ in 0..ms / self.step_ms {
            self.tick();
        }
    }

    /// Tick until the clock reaches `t_ms`.
    pub fn run_until(&mut self, t_ms: u32) {
        while self.now < t_ms {
            self.tick();
        }
    }

    /// Queue `keys` and tick once per key.
    pub fn press(&mut self, keys: &str) {
        self.hw.keys.extend(keys.chars());
        for _ in keys.chars() {
            self.tick();
        }
    }

    /// Deliver serial bytes and tick once.
    pub fn serial(&mut self, bytes: &[u8]) {
        self.hw.send(bytes);
        self.tick();
    }
}

// ── BridgeRig ─────────────────────────────────────────────────

pub struct BridgeRig {
    pub bridge: Bridge,
    pub hw: MockBridgeHw,
    pub store: MemoryRemoteStore,
    pub sink: RecordingSink,
    step_ms: u32,
}

#[allow(dead_code)]
impl BridgeRig {
    /// Default config, joins succeed, sessions are ready immediately.
    pub fn new() -> Self {
        Self::with(MockBridgeHw::new(), SessionMode::Immediate)
    }

    pub fn with(mut hw: MockBridgeHw, mode: SessionMode) -> Self {
        let config = BridgeConfig::default();
        let step_ms = config.tick_interval_ms;
        let mut store = MemoryRemoteStore::new(&config.device_root, mode);
        let mut bridge = Bridge::new(config);
        let mut sink = RecordingSink::default();
        bridge.start(&mut hw, &mut store, &mut sink);
        Self {
            bridge,
            hw,
            store,
            sink,
            step_ms,
        }
    }

    /// Default rig driven through join and session setup.
    pub fn online() -> Self {
        let mut rig = Self::new();
        rig.tick();
        rig.tick();
        rig
    }

    pub fn now(&self) -> u32 {
        self.hw.now_ms
    }

    pub fn tick(&mut self) {
        self.hw.now_ms = self.hw.now_ms.wrapping_add(self.step_ms);
        self.bridge
            .tick(&mut self.hw, &mut self.store, &mut self.sink);
    }

    pub fn run_for(&mut self, ms: u32) {
        for _ in 0..ms / self.step_ms {
            self.tick();
        }
    }

    pub fn run_until(&mut self, t_ms: u32) {
        while self.hw.now_ms < t_ms {
            self.tick();
        }
    }

    /// Put `bits` on the signal lines and tick once.
    pub fn signal(&mut self, bits: u8) {
        self.hw.signal_bits = bits;
        self.tick();
    }
}
