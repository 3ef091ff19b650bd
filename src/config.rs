//! Controller configuration parameters
//!
//! All tunable parameters for the lock controller and the connectivity
//! bridge.  Defaults are the shipped values; nothing here is mutated at
//! runtime.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Maximum length of a keypad credential.
pub const SECRET_CAP: usize = 8;

/// Keypad credential (digits and `A`–`D`).
pub type Secret = heapless::String<SECRET_CAP>;

/// Lock controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    // --- Credentials ---
    /// Operator PIN: toggles the lock.
    pub operator_pin: Secret,
    /// Admin code: enters registration mode.
    pub admin_code: Secret,

    // --- Timeouts (milliseconds) ---
    /// PIN entry inactivity timeout
    pub pin_timeout_ms: u32,
    /// Auto-lock delay after unlocking (door must be closed)
    pub auto_lock_ms: u32,
    /// How long a transient message stays on screen
    pub message_ms: u32,
    /// Dwell time in registration mode
    pub admin_dwell_ms: u32,
    /// How long a signal code is held before reverting to idle
    pub signal_hold_ms: u32,
    /// Status screen refresh interval in the calm states
    pub status_refresh_ms: u32,

    // --- Timing ---
    /// Tick period of the control loop
    pub tick_interval_ms: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            operator_pin: secret("1234"),
            admin_code: secret("9999"),

            pin_timeout_ms: 10_000,
            auto_lock_ms: 10_000,
            message_ms: 2_000,
            admin_dwell_ms: 5_000,
            signal_hold_ms: 200,
            status_refresh_ms: 2_000,

            tick_interval_ms: 20, // 50 Hz
        }
    }
}

impl LockConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_keypad_secret(&self.operator_pin) {
            return Err(ConfigError::ValidationFailed(
                "operator_pin must be 1-8 keypad digits",
            ));
        }
        if !is_keypad_secret(&self.admin_code) {
            return Err(ConfigError::ValidationFailed(
                "admin_code must be 1-8 keypad digits",
            ));
        }
        if self.operator_pin == self.admin_code {
            return Err(ConfigError::ValidationFailed(
                "operator_pin and admin_code must differ",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        for (value, msg) in [
            (self.pin_timeout_ms, "pin_timeout_ms must exceed one tick"),
            (self.auto_lock_ms, "auto_lock_ms must exceed one tick"),
            (self.message_ms, "message_ms must exceed one tick"),
            (self.admin_dwell_ms, "admin_dwell_ms must exceed one tick"),
            (self.signal_hold_ms, "signal_hold_ms must exceed one tick"),
            (self.status_refresh_ms, "status_refresh_ms must exceed one tick"),
        ] {
            if value <= self.tick_interval_ms {
                return Err(ConfigError::ValidationFailed(msg));
            }
        }
        Ok(())
    }
}

/// Connectivity bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    // --- Remote store ---
    /// Device root on the remote store
    pub device_root: heapless::String<32>,

    // --- Provisioning ---
    /// SSID of the captive provisioning portal
    pub provision_ap_ssid: heapless::String<32>,
    /// How long the join/provision call may block (seconds)
    pub provision_timeout_secs: u32,

    // --- Timeouts (milliseconds) ---
    /// Wait for the store session before giving up
    pub session_timeout_ms: u32,
    /// Fixed backoff before rejoining after a disconnect
    pub reconnect_backoff_ms: u32,
    /// How long `alert = "knock"` stays set
    pub tamper_alert_ms: u32,
    /// How long `mode = "registration"` stays set
    pub registration_ms: u32,

    // --- Timing ---
    /// Tick period of the bridge loop
    pub tick_interval_ms: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut device_root = heapless::String::new();
        let _ = device_root.push_str("/smart_lock");
        let mut provision_ap_ssid = heapless::String::new();
        let _ = provision_ap_ssid.push_str("SmartLock-Setup-AP");

        Self {
            device_root,

            provision_ap_ssid,
            provision_timeout_secs: 300, // 5 min portal window

            session_timeout_ms: 5_000,
            reconnect_backoff_ms: 10_000,
            tamper_alert_ms: 5_000,
            registration_ms: 60_000,

            tick_interval_ms: 100, // 10 Hz
        }
    }
}

impl BridgeConfig {
    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.device_root.starts_with('/') {
            return Err(ConfigError::ValidationFailed("device_root must start with '/'"));
        }
        if self.provision_ap_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("provision_ap_ssid must not be empty"));
        }
        if self.provision_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "provision_timeout_secs must be > 0",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        for (value, msg) in [
            (self.session_timeout_ms, "session_timeout_ms must exceed one tick"),
            (self.reconnect_backoff_ms, "reconnect_backoff_ms must exceed one tick"),
            (self.tamper_alert_ms, "tamper_alert_ms must exceed one tick"),
            (self.registration_ms, "registration_ms must exceed one tick"),
        ] {
            if value <= self.tick_interval_ms {
                return Err(ConfigError::ValidationFailed(msg));
            }
        }
        Ok(())
    }
}

fn secret(digits: &str) -> Secret {
    let mut s = Secret::new();
    let _ = s.push_str(digits);
    s
}

fn is_keypad_secret(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || ('A'..='D').contains(&c))
}
