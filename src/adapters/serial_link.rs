//! Serial link between the two controllers.
//!
//! - [`LoopbackSerial`]: an in-memory crossed pair of byte queues, used by
//!   the host simulation and the integration tests.
//! - [`UartSerial`] (`target_os = "espidf"`): non-blocking reads and writes
//!   on a UART installed by `hw_init`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::app::ports::SerialPort;

type Queue = Rc<RefCell<VecDeque<u8>>>;

/// One end of an in-memory serial cable.
#[derive(Debug, Clone)]
pub struct LoopbackSerial {
    rx: Queue,
    tx: Queue,
}

/// Build both ends of a crossed cable: what one end writes the other reads.
pub fn loopback_pair() -> (LoopbackSerial, LoopbackSerial) {
    let a_to_b: Queue = Rc::default();
    let b_to_a: Queue = Rc::default();
    (
        LoopbackSerial {
            rx: Rc::clone(&b_to_a),
            tx: Rc::clone(&a_to_b),
        },
        LoopbackSerial {
            rx: a_to_b,
            tx: b_to_a,
        },
    )
}

impl LoopbackSerial {
    /// Bytes waiting to be read at this end.
    pub fn available(&self) -> usize {
        self.rx.borrow().len()
    }

    /// Bytes written by this end and not yet read by the peer.
    pub fn in_flight(&self) -> usize {
        self.tx.borrow().len()
    }

    /// Inject bytes as if the peer sent them.
    pub fn inject(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().copied());
    }
}

impl SerialPort for LoopbackSerial {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.tx.borrow_mut().extend(bytes.iter().copied());
    }
}

// ── ESP-IDF UART ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct UartSerial {
    port: esp_idf_svc::sys::uart_port_t,
}

#[cfg(target_os = "espidf")]
impl UartSerial {
    /// Wrap a UART whose driver was installed by `hw_init::init_uart`.
    pub fn new(port: esp_idf_svc::sys::uart_port_t) -> Self {
        Self { port }
    }
}

#[cfg(target_os = "espidf")]
impl SerialPort for UartSerial {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        // SAFETY: one-byte buffer, zero tick timeout; driver installed at boot.
        let n = unsafe {
            esp_idf_svc::sys::uart_read_bytes(self.port, (&mut byte as *mut u8).cast(), 1, 0)
        };
        (n == 1).then_some(byte)
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        // SAFETY: bytes is valid for the duration of the call.
        let n = unsafe {
            esp_idf_svc::sys::uart_write_bytes(self.port, bytes.as_ptr().cast(), bytes.len())
        };
        if n < 0 {
            log::warn!("UART{}: write failed (rc={})", self.port, n);
        }
    }
}
