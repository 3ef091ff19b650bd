//! Inbound remote commands.
//!
//! The cloud mailbox holds a single free-form string.  The bridge parses
//! it into a [`RemoteCommand`] at the boundary and forwards the matching
//! serial message to the lock controller.

use crate::error::ProtocolError;
use crate::protocol::{ControlByte, TextToken};

/// Commands an operator can leave in the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Lock,
    Unlock,
    /// Silence an active tamper alarm.
    Disarm,
}

impl RemoteCommand {
    /// Parse a mailbox value.
    ///
    /// `""` and `"null"` (an absent JSON value read back as text) mean the
    /// mailbox is empty.  Anything else that is not a known command is a
    /// protocol desync.
    pub fn parse(raw: &str) -> Result<Option<Self>, ProtocolError> {
        match raw.trim().trim_matches('"') {
            "" | "null" => Ok(None),
            "lock" => Ok(Some(Self::Lock)),
            "unlock" => Ok(Some(Self::Unlock)),
            "disarm" => Ok(Some(Self::Disarm)),
            _ => Err(ProtocolError::UnknownCommand),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Disarm => "disarm",
        }
    }

    /// Control byte for commands that map to one.
    pub const fn control_byte(self) -> Option<ControlByte> {
        match self {
            Self::Lock => Some(ControlByte::Lock),
            Self::Unlock => Some(ControlByte::Unlock),
            Self::Disarm => None,
        }
    }

    /// Bytes to put on the serial link for this command.
    pub const fn serial_bytes(self) -> &'static [u8] {
        match self {
            Self::Lock => b"L",
            Self::Unlock => b"U",
            Self::Disarm => TextToken::Disarm.line_bytes(),
        }
    }
}
