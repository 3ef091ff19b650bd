//! Serial channel framing.
//!
//! The UART carries two kinds of traffic on the same byte stream:
//!
//! * raw control bytes `'L'` / `'U'` (bridge → lock), acted on as soon as
//!   they arrive and never part of a text line;
//! * newline-terminated text tokens (`WIFI_CONNECTED`, `WIFI_DISCONNECTED`,
//!   `DISARM`).
//!
//! [`LineAssembler`] splits the stream into [`SerialFrame`]s one byte at a
//! time.  `\n`, `\r` and `\r\n` all terminate a line; empty lines are
//! dropped.

use core::fmt;

/// Capacity of the text line buffer.  The longest token is 17 bytes.
pub const LINE_CAP: usize = 32;

/// Single-byte commands from the bridge to the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlByte {
    Lock,
    Unlock,
}

impl ControlByte {
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Lock => b'L',
            Self::Unlock => b'U',
        }
    }

    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'L' => Some(Self::Lock),
            b'U' => Some(Self::Unlock),
            _ => None,
        }
    }
}

/// Newline-terminated text tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextToken {
    WifiConnected,
    WifiDisconnected,
    Disarm,
}

impl TextToken {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WifiConnected => "WIFI_CONNECTED",
            Self::WifiDisconnected => "WIFI_DISCONNECTED",
            Self::Disarm => "DISARM",
        }
    }

    /// Token plus its `\n` terminator, ready for the wire.
    pub const fn line_bytes(self) -> &'static [u8] {
        match self {
            Self::WifiConnected => b"WIFI_CONNECTED\n",
            Self::WifiDisconnected => b"WIFI_DISCONNECTED\n",
            Self::Disarm => b"DISARM\n",
        }
    }

    /// Parse a complete line (terminator already stripped).  Surrounding
    /// whitespace is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "WIFI_CONNECTED" => Some(Self::WifiConnected),
            "WIFI_DISCONNECTED" => Some(Self::WifiDisconnected),
            "DISARM" => Some(Self::Disarm),
            _ => None,
        }
    }
}

impl fmt::Display for TextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded unit of serial traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialFrame {
    Control(ControlByte),
    Token(TextToken),
    /// A complete line that is not a known token.  Non-printable bytes are
    /// replaced with `?`.
    Unknown(heapless::String<LINE_CAP>),
    /// The current line exceeded [`LINE_CAP`] and is being discarded.
    /// Reported once per over-long line.
    Overflow,
}

/// Byte-at-a-time frame decoder for the serial channel.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: heapless::Vec<u8, LINE_CAP>,
    discarding: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            discarding: false,
        }
    }

    /// Feed one byte.  Returns a frame when the byte completes one.
    pub fn push(&mut self, byte: u8) -> Option<SerialFrame> {
        if let Some(control) = ControlByte::from_byte(byte) {
            return Some(SerialFrame::Control(control));
        }

        if byte == b'\n' || byte == b'\r' {
            if self.discarding {
                self.discarding = false;
                return None;
            }
            return self.finish_line();
        }

        if self.discarding {
            return None;
        }

        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.discarding = true;
            return Some(SerialFrame::Overflow);
        }
        None
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn finish_line(&mut self) -> Option<SerialFrame> {
        if self.buf.is_empty() {
            return None;
        }

        let mut text: heapless::String<LINE_CAP> = heapless::String::new();
        for &b in &self.buf {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            // Same capacity as `buf`, cannot overflow.
            let _ = text.push(c);
        }
        self.buf.clear();

        match TextToken::parse(&text) {
            Some(token) => Some(SerialFrame::Token(token)),
            None if text.trim().is_empty() => None,
            None => Some(SerialFrame::Unknown(text)),
        }
    }
}
