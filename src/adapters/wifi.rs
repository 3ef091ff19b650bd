//! WiFi station-mode adapter with captive-portal provisioning.
//!
//! Implements [`NetworkPort`] for the bridge.  Credentials are persisted
//! through any [`StoragePort`] (postcard-encoded [`WifiCredentials`] in the
//! `wifi` namespace) so a reboot rejoins without provisioning.
//!
//! ## Join policy
//!
//! 1. Stored credentials → STA connect.
//! 2. None stored, or the connect failed → open the setup access point and
//!    wait (bounded by `timeout_secs`) for credentials from the portal.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation; tests submit portal credentials and
//!   inject join failures or link loss.

use core::fmt;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{ConnectivityError, NetworkPort, StorageError, StoragePort};

/// Storage namespace for network credentials.
pub const WIFI_NAMESPACE: &str = "wifi";
const CREDS_KEY: &str = "creds";

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

/// Station credentials as stored in flash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    /// Validate and build.  SSID: 1–32 printable ASCII bytes.  Password:
    /// empty (open network) or 8–64 bytes (WPA2).
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(creds)
    }
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    /// Setup access point open, waiting for the portal.
    Provisioning,
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter<S: StoragePort> {
    storage: S,
    state: WifiState,
    ap_ssid: heapless::String<32>,
    creds: Option<WifiCredentials>,
    /// Simulation: credentials the portal will hand over on the next join.
    #[cfg(not(target_os = "espidf"))]
    sim_portal: Option<WifiCredentials>,
    /// Simulation: number of upcoming STA connects that fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
}

impl<S: StoragePort> WifiAdapter<S> {
    /// Build the adapter and pick up any stored credentials.
    pub fn new(storage: S, ap_ssid: &str) -> Self {
        let mut name = heapless::String::new();
        for ch in ap_ssid.chars() {
            if name.push(ch).is_err() {
                break;
            }
        }
        let mut adapter = Self {
            storage,
            state: WifiState::Disconnected,
            ap_ssid: name,
            creds: None,
            #[cfg(not(target_os = "espidf"))]
            sim_portal: None,
            #[cfg(not(target_os = "espidf"))]
            sim_failures: 0,
        };
        adapter.creds = adapter.load_credentials();
        adapter
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn has_credentials(&self) -> bool {
        self.creds.is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validate, persist and adopt new credentials.
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        let creds = WifiCredentials::new(ssid, password)?;
        let bytes = postcard::to_allocvec(&creds).map_err(|_| StorageError::IoError)?;
        self.storage.write(WIFI_NAMESPACE, CREDS_KEY, &bytes)?;
        info!("WiFi: credentials stored (SSID='{}')", creds.ssid);
        self.creds = Some(creds);
        Ok(())
    }

    fn load_credentials(&self) -> Option<WifiCredentials> {
        let mut buf = [0u8; 128];
        match self.storage.read(WIFI_NAMESPACE, CREDS_KEY, &mut buf) {
            Ok(len) => match postcard::from_bytes::<WifiCredentials>(&buf[..len]) {
                Ok(creds) => {
                    info!("WiFi: stored credentials for '{}'", creds.ssid);
                    Some(creds)
                }
                Err(_) => {
                    warn!("WiFi: stored credentials corrupted, ignoring");
                    None
                }
            },
            Err(StorageError::NotFound) => None,
            Err(e) => {
                warn!("WiFi: credential read failed: {}", e);
                None
            }
        }
    }

    fn connect_station(&mut self) -> Result<(), ConnectivityError> {
        let Some(creds) = self.creds.clone() else {
            return Err(ConnectivityError::JoinFailed);
        };
        info!("WiFi: connecting to '{}'", creds.ssid);
        match self.platform_connect(&creds) {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected to '{}'", creds.ssid);
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.state = WifiState::Disconnected;
                Err(e)
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, _creds: &WifiCredentials) -> Result<(), ConnectivityError> {
        // EspWifi::new(modem, sysloop, nvs) is threaded in from main.rs;
        // set_configuration(Client{ssid, password}) → start() → connect().
        info!("WiFi(espidf): STA connect deferred until peripheral wiring");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, creds: &WifiCredentials) -> Result<(), ConnectivityError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            warn!("WiFi(sim): simulated join failure for '{}'", creds.ssid);
            return Err(ConnectivityError::JoinFailed);
        }
        Ok(())
    }

    /// Run the setup portal until credentials arrive or the window closes.
    #[cfg(target_os = "espidf")]
    fn platform_provision(&mut self, timeout_secs: u32) -> Option<WifiCredentials> {
        // Soft-AP + HTTP captive portal; blocks for at most timeout_secs.
        info!(
            "WiFi(espidf): portal '{}' open for {}s (deferred until peripheral wiring)",
            self.ap_ssid, timeout_secs
        );
        None
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_provision(&mut self, timeout_secs: u32) -> Option<WifiCredentials> {
        info!("WiFi(sim): portal '{}' open for up to {}s", self.ap_ssid, timeout_secs);
        self.sim_portal.take()
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        // wifi.disconnect().ok();
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }
}

// ── Simulation controls ───────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl<S: StoragePort> WifiAdapter<S> {
    /// Queue credentials as if a user submitted them on the portal.
    pub fn sim_submit_portal(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        self.sim_portal = Some(WifiCredentials::new(ssid, password)?);
        Ok(())
    }

    /// Make the next `n` STA connects fail.
    pub fn sim_fail_joins(&mut self, n: u32) {
        self.sim_failures = n;
    }

    /// Drop the link as if the access point went away.
    pub fn sim_drop_link(&mut self) {
        if self.state == WifiState::Connected {
            warn!("WiFi(sim): link lost");
            self.state = WifiState::Disconnected;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl<S: StoragePort> NetworkPort for WifiAdapter<S> {
    fn join_or_provision(&mut self, timeout_secs: u32) -> bool {
        if self.state == WifiState::Connected {
            return true;
        }
        if self.creds.is_some() && self.connect_station().is_ok() {
            return true;
        }

        self.state = WifiState::Provisioning;
        let Some(creds) = self.platform_provision(timeout_secs) else {
            warn!("WiFi: provisioning window closed without credentials");
            self.state = WifiState::Disconnected;
            return false;
        };
        if let Err(e) = self.set_credentials(&creds.ssid, &creds.password) {
            warn!("WiFi: portal credentials rejected: {}", e);
            self.state = WifiState::Disconnected;
            return false;
        }
        self.connect_station().is_ok()
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    fn reset_credentials(&mut self) -> Result<(), ConnectivityError> {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        self.creds = None;
        self.storage.delete(WIFI_NAMESPACE, CREDS_KEY)?;
        warn!("WiFi: stored credentials erased");
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
