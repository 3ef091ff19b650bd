//! Fuzz target: `RemoteCommand::parse`
//!
//! The mailbox value is written by an untrusted app; parsing must be total
//! and anything accepted must forward a known serial message.
//!
//! cargo fuzz run fuzz_mailbox

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartlock::app::commands::RemoteCommand;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(Some(cmd)) = RemoteCommand::parse(raw) {
        let bytes = cmd.serial_bytes();
        assert!(bytes == b"L" || bytes == b"U" || bytes == b"DISARM\n");
    }
});
