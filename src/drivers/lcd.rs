//! 16×2 character LCD driver (HD44780 behind a PCF8574 I²C backpack).
//!
//! The backpack maps P0=RS, P1=RW, P2=EN, P3=backlight, P4–P7=D4–D7, so
//! every HD44780 byte goes out as two 4-bit nibbles, each latched by an
//! EN pulse.  Lines are padded to the full width instead of clearing the
//! screen, which avoids flicker on status refreshes.
//!
//! On host/test the two lines are kept in memory.

use log::warn;

use crate::drivers::hw_init;
use crate::pins;

pub const COLS: usize = 16;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// The two I²C frames that latch one nibble.
pub const fn nibble_frames(nibble: u8, rs: bool) -> [u8; 2] {
    let base = ((nibble & 0x0F) << 4) | BACKLIGHT | if rs { RS } else { 0 };
    [base | EN, base]
}

/// Pad or truncate `text` to exactly [`COLS`] bytes.
pub fn fit_line(text: &str) -> [u8; COLS] {
    let mut row = [b' '; COLS];
    for (slot, ch) in row.iter_mut().zip(text.chars()) {
        *slot = if ch.is_ascii() && !ch.is_ascii_control() { ch as u8 } else { b'?' };
    }
    row
}

pub struct LcdDriver {
    lines: [heapless::String<COLS>; 2],
    bus_errors: u32,
}

impl Default for LcdDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdDriver {
    pub fn new() -> Self {
        Self {
            lines: [heapless::String::new(), heapless::String::new()],
            bus_errors: 0,
        }
    }

    /// Run the HD44780 4-bit power-on sequence.
    pub fn init(&mut self) {
        delay_ms(50);
        for _ in 0..3 {
            self.write_nibble(0x03, false);
            delay_ms(5);
        }
        self.write_nibble(0x02, false);
        self.command(CMD_FUNCTION_4BIT_2LINE);
        self.command(CMD_DISPLAY_ON);
        self.command(CMD_ENTRY_INCREMENT);
        self.command(CMD_CLEAR);
        delay_ms(2);
    }

    /// Show two lines, each padded/truncated to the display width.
    pub fn show(&mut self, line1: &str, line2: &str) {
        for (row, text) in [line1, line2].into_iter().enumerate() {
            self.command(CMD_SET_DDRAM | ROW_OFFSETS[row]);
            let fitted = fit_line(text);
            for &b in &fitted {
                self.data(b);
            }
            self.lines[row].clear();
            for &b in fitted.iter() {
                // fitted is printable ASCII and exactly COLS long.
                let _ = self.lines[row].push(b as char);
            }
        }
    }

    /// Text currently on screen, trailing padding removed.
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map_or("", |l| l.trim_end())
    }

    /// I²C writes that were not acknowledged.
    pub fn bus_errors(&self) -> u32 {
        self.bus_errors
    }

    fn command(&mut self, cmd: u8) {
        self.write_byte(cmd, false);
    }

    fn data(&mut self, byte: u8) {
        self.write_byte(byte, true);
    }

    fn write_byte(&mut self, byte: u8, rs: bool) {
        self.write_nibble(byte >> 4, rs);
        self.write_nibble(byte & 0x0F, rs);
    }

    fn write_nibble(&mut self, nibble: u8, rs: bool) {
        if !hw_init::i2c_write(pins::LCD_I2C_ADDR, &nibble_frames(nibble, rs)) {
            if self.bus_errors == 0 {
                warn!("LCD: no ACK from 0x{:02X}", pins::LCD_I2C_ADDR);
            }
            self.bus_errors = self.bus_errors.wrapping_add(1);
        }
    }
}

#[cfg(target_os = "espidf")]
fn delay_ms(ms: u64) {
    std::thread::sleep(std::time::Duration::from_millis(ms));
}

#[cfg(not(target_os = "espidf"))]
fn delay_ms(_ms: u64) {}
