//! Fuzz target: `LineAssembler::push`
//!
//! Drives arbitrary byte sequences through the serial frame decoder and
//! asserts that it never panics, never buffers past its capacity, and
//! always recovers at a line terminator.
//!
//! cargo fuzz run fuzz_serial_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartlock::protocol::serial::LINE_CAP;
use smartlock::protocol::{ControlByte, LineAssembler, SerialFrame};

fuzz_target!(|data: &[u8]| {
    let mut rx = LineAssembler::new();

    for &b in data {
        match rx.push(b) {
            Some(SerialFrame::Control(c)) => assert_eq!(ControlByte::from_byte(b), Some(c)),
            Some(SerialFrame::Unknown(line)) => {
                assert!(!line.is_empty() && line.len() <= LINE_CAP);
            }
            _ => {}
        }
        assert!(rx.pending() <= LINE_CAP, "line buffer overran");
    }

    // A terminator always leaves the decoder ready for a fresh line.
    let _ = rx.push(b'\n');
    assert_eq!(rx.pending(), 0);
});
