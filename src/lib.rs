//! SmartLock firmware library.
//!
//! Two controllers share this crate: the keypad lock controller
//! ([`lock`]) and the Wi-Fi connectivity bridge ([`bridge`]).  They talk
//! over three signal lines and a UART ([`protocol`]).  Everything here
//! builds and tests on the host; ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod lock;
pub mod protocol;
pub mod timer;

pub mod adapters;
pub mod drivers;

pub mod pins;
