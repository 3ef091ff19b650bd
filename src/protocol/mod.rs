//! Inter-controller protocol.
//!
//! Two independent, asymmetric channels couple the lock controller and the
//! connectivity bridge:
//!
//! ```text
//!   Lock controller                          Connectivity bridge
//!  ┌──────────────┐  3 GPIO lines (MSB first) ┌──────────────┐
//!  │  SignalCode  │ ─────────────────────────▶│  sample+edge │
//!  │              │                           │              │
//!  │ LineAssembler│ ◀──── 'L' / 'U' bytes ─── │              │
//!  │              │ ◀──── TOKEN\n lines ────▶ │ LineAssembler│
//!  └──────────────┘        (UART)             └──────────────┘
//! ```
//!
//! The signal line is best-effort: a code is held for a bounded interval
//! and then released to idle, with no acknowledgement.  The serial stream
//! mixes single raw control bytes with newline-terminated text; the
//! receiver acts on control bytes immediately and never buffers them.

pub mod serial;
pub mod signal;

pub use serial::{ControlByte, LineAssembler, SerialFrame, TextToken};
pub use signal::SignalCode;
