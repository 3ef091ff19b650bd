//! Unified error types for the SmartLock firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level loops' error handling uniform.  Port-specific errors live
//! next to their traits in [`crate::app::ports`]; this module adds the
//! protocol errors and the umbrella type.  All variants are `Copy`.

use core::fmt;

use crate::app::ports::{ConfigError, ConnectivityError, StorageError, StoreError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The remote status store failed a request.
    Store(StoreError),
    /// Non-volatile storage failed.
    Storage(StorageError),
    /// The network adapter failed.
    Connectivity(ConnectivityError),
    /// The peer controller sent something we could not interpret.
    Protocol(ProtocolError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Desync between the two controllers or between the bridge and the
/// cloud mailbox.  Always logged, never fatal, never a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Signal code `101` or `110`.
    UnrecognizedSignal(u8),
    /// Mailbox value is not a known command.
    UnknownCommand,
    /// Serial line is not a known token.
    UnknownLine,
    /// Serial line exceeded the assembler capacity.
    LineOverflow,
    /// Control byte received in a state that does not accept it.
    UnexpectedControl(u8),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedSignal(bits) => write!(f, "unrecognized signal {bits:03b}"),
            Self::UnknownCommand => write!(f, "unknown remote command"),
            Self::UnknownLine => write!(f, "unknown serial line"),
            Self::LineOverflow => write!(f, "serial line overflow"),
            Self::UnexpectedControl(b) => {
                write!(f, "control byte '{}' not accepted here", *b as char)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
