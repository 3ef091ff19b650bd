//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LockController / Bridge (domain)
//! ```
//!
//! Driven adapters (servo, keypad, display, signal wires, UART, Wi-Fi,
//! remote store) implement these traits.  The two controller services
//! consume them via generics, so the domain core never touches hardware
//! directly.
//!
//! ## Security notes
//!
//! - **StoragePort** implementations SHOULD encrypt sensitive keys.
//! - **NetworkPort::reset_credentials** is destructive and is only reached
//!   through the factory-reset signal code.
//! - All port errors are typed; callers must handle every variant explicitly.

use serde::Serialize;

use crate::protocol::SignalCode;

// ───────────────────────────────────────────────────────────────
// Lock-side vocabulary
// ───────────────────────────────────────────────────────────────

/// Bolt position commanded to the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPosition {
    Locked,
    Unlocked,
}

impl LockPosition {
    /// Servo angle for this position.
    pub const fn angle_deg(self) -> u8 {
        match self {
            Self::Locked => 90,
            Self::Unlocked => 0,
        }
    }
}

/// Audible feedback patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Correct PIN.
    Confirm,
    /// Wrong PIN.
    Error,
    /// Registration mode entered.
    AdminChime,
    /// One on/off pulse of the tamper siren.
    AlarmPulse,
}

impl Tone {
    /// Time the buzzer is driven.
    pub const fn on_ms(self) -> u32 {
        match self {
            Self::Confirm => 200,
            Self::Error => 500,
            Self::AdminChime | Self::AlarmPulse => 100,
        }
    }

    /// Silence appended after the tone (paces the chime and the siren).
    pub const fn off_ms(self) -> u32 {
        match self {
            Self::AdminChime => 50,
            Self::AlarmPulse => 100,
            Self::Confirm | Self::Error => 0,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Lock controller ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Bolt actuator and the "locked" indicator LED.
///
/// Commands are fire-and-forget: there is no position feedback.
pub trait ActuatorPort {
    fn move_to(&mut self, position: LockPosition);

    fn set_indicator(&mut self, on: bool);
}

/// Piezo buzzer.  `beep` may block for the tone duration (≤ 500 ms).
pub trait BuzzerPort {
    fn beep(&mut self, tone: Tone);
}

/// Two-row character display.
pub trait DisplayPort {
    /// Clear and draw both rows.  Text longer than the panel is truncated
    /// by the adapter.
    fn render(&mut self, line1: &str, line2: &str);
}

/// Matrix keypad.
pub trait KeypadPort {
    /// Next debounced keypress, if any.  Never blocks.
    fn next_key(&mut self) -> Option<char>;
}

/// Reed switch on the door frame.
pub trait DoorSensorPort {
    fn is_closed(&self) -> bool;
}

/// Drives the three status lines towards the bridge.
pub trait SignalOutPort {
    fn write_signal(&mut self, code: SignalCode);
}

// ───────────────────────────────────────────────────────────────
// Shared ports
// ───────────────────────────────────────────────────────────────

/// Byte-oriented UART between the two controllers.
pub trait SerialPort {
    /// Next received byte, if any.  Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    fn write_bytes(&mut self, bytes: &[u8]);
}

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Bridge ports
// ───────────────────────────────────────────────────────────────

/// Samples the three status lines driven by the lock controller.
pub trait SignalInPort {
    /// Packed `(registration, tamper, lock_status)` bits, MSB first.
    fn sample_signal(&mut self) -> u8;
}

/// Wi-Fi station plus the captive provisioning portal.
pub trait NetworkPort {
    /// Join with stored credentials or open the provisioning portal for at
    /// most `timeout_secs`.  The only blocking call the bridge makes.
    fn join_or_provision(&mut self, timeout_secs: u32) -> bool;

    fn is_connected(&self) -> bool;

    /// Erase stored network credentials (factory reset).
    fn reset_credentials(&mut self) -> Result<(), ConnectivityError>;
}

/// Monotonic and wall-clock time for the bridge.
pub trait ClockPort {
    /// Milliseconds since boot.  Wraps after ~49.7 days.
    fn uptime_ms(&self) -> u32;

    /// Seconds since the Unix epoch, or `None` if not yet synced.
    fn unix_time(&self) -> Option<u64>;
}

/// Status paths the bridge writes on the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    IsOnline,
    IsLocked,
    Alert,
    Mode,
    LastSeen,
}

impl StatusField {
    /// Path relative to the device root.
    pub const fn path(self) -> &'static str {
        match self {
            Self::IsOnline => "status/isOnline",
            Self::IsLocked => "status/isLocked",
            Self::Alert => "status/alert",
            Self::Mode => "status/mode",
            Self::LastSeen => "status/lastSeen",
        }
    }
}

/// Path of the single-slot command mailbox.
pub const COMMAND_PATH: &str = "command";

pub const ALERT_KNOCK: &str = "knock";
pub const ALERT_NONE: &str = "none";
pub const MODE_REGISTRATION: &str = "registration";
pub const MODE_NORMAL: &str = "normal";

/// Value written to a [`StatusField`].  Serialises to a bare JSON scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(&'static str),
    UnixSeconds(u64),
}

/// Cloud key/value store holding status fields and the command mailbox.
pub trait RemoteStore {
    /// Begin (or restart) the authenticated session.  Non-blocking.
    fn start_session(&mut self);

    fn is_session_ready(&self) -> bool;

    /// Current mailbox contents.  `Ok(None)` when the slot is absent.
    fn read_command(&mut self) -> Result<Option<String>, StoreError>;

    /// Reset the mailbox to the empty string.
    fn clear_command(&mut self) -> Result<(), StoreError>;

    fn write_field(&mut self, field: StatusField, value: &FieldValue) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Port bundles (one `&mut` per controller board)
// ───────────────────────────────────────────────────────────────

/// Everything the lock controller drives or samples.
pub trait LockHardware:
    ActuatorPort + BuzzerPort + DisplayPort + KeypadPort + DoorSensorPort + SignalOutPort + SerialPort
{
}

impl<T> LockHardware for T where
    T: ActuatorPort + BuzzerPort + DisplayPort + KeypadPort + DoorSensorPort + SignalOutPort + SerialPort
{
}

/// Everything the bridge drives or samples, except the remote store.
pub trait BridgeHardware: NetworkPort + SignalInPort + SerialPort + ClockPort {}

impl<T> BridgeHardware for T where T: NetworkPort + SignalInPort + SerialPort + ClockPort {}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for NVS, credentials, etc.
///
/// # Security
///
/// - Implementations SHOULD encrypt sensitive keys (Wi-Fi passwords).
///   On ESP32, prefer the encrypted NVS partition for these.
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic: no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation and loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`RemoteStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No session, or the session is not ready yet.
    NotReady,
    /// The request did not complete in time.
    Timeout,
    /// The store refused the request (auth, rules).
    Rejected,
    /// Transport failure.
    IoError,
}

/// Errors from the network adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    /// SSID empty, too long, or not printable ASCII.
    InvalidSsid,
    /// Password neither empty (open network) nor 8–64 bytes.
    InvalidPassword,
    /// Join attempt failed or timed out.
    JoinFailed,
    /// Credential persistence failed.
    Storage(StorageError),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "session not ready"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Rejected => write!(f, "request rejected"),
            Self::IoError => write!(f, "transport error"),
        }
    }
}

impl core::fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "invalid SSID"),
            Self::InvalidPassword => write!(f, "invalid password"),
            Self::JoinFailed => write!(f, "join failed"),
            Self::Storage(e) => write!(f, "credential storage: {}", e),
        }
    }
}

impl From<StorageError> for ConnectivityError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
