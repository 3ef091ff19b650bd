//! SmartLock Firmware: Main Entry Point
//!
//! One image, two roles.  On the device the role strap picks the lock
//! controller or the connectivity bridge; on the host both run in one
//! loop, wired together by simulated signal lines and a loopback UART.
//!
//! ```text
//! ┌──────────────────────────────┐   signal (3 bits)   ┌──────────────────────────────┐
//! │        LockController        │ ──────────────────▶ │            Bridge            │
//! │ LockBoard: servo, LCD,       │                     │ BridgeBoard: WiFi, sampler,  │
//! │ keypad, buzzer, reed, LED    │ ◀── UART L/U/text ─ │ UART, clock                  │
//! │ TAMPER_FLAG ◀── knock ISR    │                     │ RemoteStore ◀──▶ cloud       │
//! └──────────────────────────────┘                     └──────────────────────────────┘
//! ```

use anyhow::Result;
use log::{info, warn};
use serde::de::DeserializeOwned;

use smartlock::adapters::nvs::{load_config, NvsAdapter};
use smartlock::app::ports::ConfigError;
use smartlock::config::{BridgeConfig, LockConfig};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartLock v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    run()
}

#[cfg(target_os = "espidf")]
use device::run;
#[cfg(not(target_os = "espidf"))]
use sim::run;

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))?;
    Ok(())
}

/// Load a stored config, falling back to defaults when it is missing,
/// unreadable or fails validation.
fn load_or_default<T>(nvs: &NvsAdapter, validate: fn(&T) -> Result<(), ConfigError>) -> T
where
    T: DeserializeOwned + Default,
{
    match load_config::<T, _>(nvs) {
        Ok(cfg) => match validate(&cfg) {
            Ok(()) => cfg,
            Err(e) => {
                warn!("Stored config rejected ({}), using defaults", e);
                T::default()
            }
        },
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            T::default()
        }
    }
}

fn open_nvs() -> NvsAdapter {
    NvsAdapter::new().unwrap_or_else(|e| {
        // Continue without persistence; NVS self-heals on next boot.
        warn!("NVS init failed ({}), running without persistence", e);
        NvsAdapter::default()
    })
}

fn load_lock_config(nvs: &NvsAdapter) -> LockConfig {
    load_or_default(nvs, LockConfig::validate)
}

fn load_bridge_config(nvs: &NvsAdapter) -> BridgeConfig {
    load_or_default(nvs, BridgeConfig::validate)
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod device {
    use std::time::Duration;

    use anyhow::Result;
    use log::{info, warn};

    use smartlock::adapters::bridge_board::BridgeBoard;
    use smartlock::adapters::lock_board::LockBoard;
    use smartlock::adapters::log_sink::LogEventSink;
    use smartlock::adapters::remote_store::{MemoryRemoteStore, SessionMode};
    use smartlock::adapters::serial_link::UartSerial;
    use smartlock::adapters::signal_wire::{SignalLines, SignalSampler};
    use smartlock::adapters::time::Esp32TimeAdapter;
    use smartlock::adapters::wifi::WifiAdapter;
    use smartlock::bridge::Bridge;
    use smartlock::drivers::hw_init::{self, BoardRole, RawPin};
    use smartlock::events::TAMPER_FLAG;
    use smartlock::lock::LockController;
    use smartlock::pins;

    pub fn run() -> Result<()> {
        let role = hw_init::read_role();
        info!("Boot: role={:?}", role);

        hw_init::init_peripherals(role).map_err(|e| anyhow::anyhow!("HAL init failed: {e}"))?;
        let nvs = super::open_nvs();
        let clock = Esp32TimeAdapter::new();
        let serial = UartSerial::new(pins::LINK_UART_PORT);

        match role {
            BoardRole::Lock => {
                if let Err(e) = hw_init::init_isr_service() {
                    warn!("ISR service init failed ({}), tamper detection disabled", e);
                }
                let config = super::load_lock_config(&nvs);
                let tick = Duration::from_millis(u64::from(config.tick_interval_ms));
                let lines = SignalLines::new(
                    RawPin(pins::SIGNAL_REG_GPIO),
                    RawPin(pins::SIGNAL_TAMPER_GPIO),
                    RawPin(pins::SIGNAL_LOCK_GPIO),
                );
                let mut board = LockBoard::new(serial, lines);
                let mut sink = LogEventSink::new("lock");
                let mut lock = LockController::new(config, &TAMPER_FLAG);

                lock.start(clock.now_ms(), &mut board, &mut sink);
                info!("System ready. Entering lock loop.");
                loop {
                    lock.tick(clock.now_ms(), &mut board, &mut sink);
                    std::thread::sleep(tick);
                }
            }
            BoardRole::Bridge => {
                let config = super::load_bridge_config(&nvs);
                let tick = Duration::from_millis(u64::from(config.tick_interval_ms));
                let sampler = SignalSampler::new(
                    RawPin(pins::SIGNAL_REG_GPIO),
                    RawPin(pins::SIGNAL_TAMPER_GPIO),
                    RawPin(pins::SIGNAL_LOCK_GPIO),
                );
                let wifi = WifiAdapter::new(nvs, &config.provision_ap_ssid);
                let mut board = BridgeBoard::new(wifi, sampler, serial, clock);
                // The cloud client is an external collaborator; until it is
                // linked in, the bridge runs against the in-memory store.
                warn!("Remote store client not linked, using in-memory store");
                let mut store = MemoryRemoteStore::new(&config.device_root, SessionMode::Immediate);
                let mut sink = LogEventSink::new("bridge");
                let mut bridge = Bridge::new(config);

                bridge.start(&mut board, &mut store, &mut sink);
                info!("System ready. Entering bridge loop.");
                loop {
                    bridge.tick(&mut board, &mut store, &mut sink);
                    std::thread::sleep(tick);
                }
            }
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::io::BufRead;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    use anyhow::Result;
    use log::{info, warn};

    use smartlock::adapters::bridge_board::BridgeBoard;
    use smartlock::adapters::lock_board::LockBoard;
    use smartlock::adapters::log_sink::LogEventSink;
    use smartlock::adapters::nvs::NvsAdapter;
    use smartlock::adapters::remote_store::{MemoryRemoteStore, SessionMode};
    use smartlock::adapters::serial_link::loopback_pair;
    use smartlock::adapters::signal_wire::sim_signal_bus;
    use smartlock::adapters::time::Esp32TimeAdapter;
    use smartlock::adapters::wifi::WifiAdapter;
    use smartlock::app::ports::NetworkPort;
    use smartlock::bridge::Bridge;
    use smartlock::drivers::hw_init::{self, BoardRole};
    use smartlock::error::Error;
    use smartlock::events::TAMPER_FLAG;
    use smartlock::lock::LockController;

    const HELP: &str = "commands: keys <1234#> | knock | door open|close | app lock|unlock|disarm \
                        | portal <ssid> <pass> | forget | wifi drop | session drop | status | quit";

    /// One line typed on stdin.
    enum SimInput {
        Keys(String),
        Knock,
        Door { closed: bool },
        App(String),
        Portal { ssid: String, password: String },
        Forget,
        DropWifi,
        DropSession,
        Status,
        Quit,
        Help,
    }

    impl SimInput {
        fn parse(line: &str) -> Option<Self> {
            let mut words = line.split_whitespace();
            let input = match (words.next()?, words.next()) {
                ("keys" | "k", Some(keys)) => Self::Keys(keys.to_string()),
                ("knock", None) => Self::Knock,
                ("door", Some("open")) => Self::Door { closed: false },
                ("door", Some("close" | "closed")) => Self::Door { closed: true },
                ("app", Some(cmd)) => Self::App(cmd.to_string()),
                ("portal", Some(ssid)) => Self::Portal {
                    ssid: ssid.to_string(),
                    password: words.next().unwrap_or_default().to_string(),
                },
                ("forget", None) => Self::Forget,
                ("wifi", Some("drop")) => Self::DropWifi,
                ("session", Some("drop")) => Self::DropSession,
                ("status", None) => Self::Status,
                ("quit" | "exit", None) => Self::Quit,
                _ => Self::Help,
            };
            Some(input)
        }
    }

    fn spawn_stdin_reader() -> Receiver<String> {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn run() -> Result<()> {
        hw_init::init_peripherals(BoardRole::Lock).map_err(|e| anyhow::anyhow!("{e}"))?;
        hw_init::init_peripherals(BoardRole::Bridge).map_err(|e| anyhow::anyhow!("{e}"))?;

        let lock_nvs = super::open_nvs();
        let lock_config = super::load_lock_config(&lock_nvs);
        let bridge_nvs = NvsAdapter::new().map_err(Error::from)?;
        let bridge_config = super::load_bridge_config(&bridge_nvs);

        let clock = Esp32TimeAdapter::new();
        let (lock_serial, bridge_serial) = loopback_pair();
        let (lines, sampler) = sim_signal_bus();

        let mut lock_board = LockBoard::new(lock_serial, lines);
        let mut wifi = WifiAdapter::new(bridge_nvs, &bridge_config.provision_ap_ssid);
        wifi.set_credentials("SimNet", "simulated-pass").map_err(Error::from)?;
        let mut bridge_board =
            BridgeBoard::new(wifi, sampler, bridge_serial, Esp32TimeAdapter::new());
        let mut store = MemoryRemoteStore::new(&bridge_config.device_root, SessionMode::Immediate);

        let mut lock_sink = LogEventSink::new("lock");
        let mut bridge_sink = LogEventSink::new("bridge");

        let tick = Duration::from_millis(u64::from(lock_config.tick_interval_ms));
        let bridge_every = (bridge_config.tick_interval_ms / lock_config.tick_interval_ms).max(1);

        let mut lock = LockController::new(lock_config, &TAMPER_FLAG);
        let mut bridge = Bridge::new(bridge_config);

        lock.start(clock.now_ms(), &mut lock_board, &mut lock_sink);
        bridge.start(&mut bridge_board, &mut store, &mut bridge_sink);

        info!("Simulation ready. {}", HELP);
        let input = spawn_stdin_reader();
        let mut cycle: u32 = 0;

        loop {
            for line in input.try_iter() {
                let Some(cmd) = SimInput::parse(&line) else { continue };
                match cmd {
                    SimInput::Keys(keys) => lock_board.keypad.sim_type(&keys),
                    SimInput::Knock => lock.on_tamper_edge(),
                    SimInput::Door { closed } => lock_board.door.sim_set_closed(closed),
                    SimInput::App(raw) => store.push_command(&raw),
                    SimInput::Portal { ssid, password } => {
                        if let Err(e) = bridge_board.network.sim_submit_portal(&ssid, &password) {
                            warn!("SIM: portal rejected credentials: {}", e);
                        }
                    }
                    SimInput::Forget => {
                        if let Err(e) = bridge_board.network.reset_credentials() {
                            warn!("SIM: forget failed: {}", e);
                        }
                    }
                    SimInput::DropWifi => bridge_board.network.sim_drop_link(),
                    SimInput::DropSession => store.drop_session(),
                    SimInput::Status => {
                        info!(
                            "SIM: lock={:?} locked={} signal={} link={:?} | bridge={:?}",
                            lock.state(),
                            lock.is_locked(),
                            lock.signal(),
                            lock.link_status(),
                            bridge.state(),
                        );
                        info!("SIM: lcd=[{}] [{}]", lock_board.lcd.line(0), lock_board.lcd.line(1));
                        info!("SIM: store={}", store.document());
                    }
                    SimInput::Quit => {
                        info!("SIM: bye after {} lock ticks", lock.tick_count());
                        return Ok(());
                    }
                    SimInput::Help => info!("{}", HELP),
                }
            }

            lock.tick(clock.now_ms(), &mut lock_board, &mut lock_sink);
            if cycle % bridge_every == 0 {
                bridge.tick(&mut bridge_board, &mut store, &mut bridge_sink);
            }
            cycle = cycle.wrapping_add(1);

            std::thread::sleep(tick);
        }
    }
}
