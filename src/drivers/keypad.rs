//! 4×4 matrix keypad driver with scan debouncing.
//!
//! ## Scanning
//!
//! Rows are driven LOW one at a time while the pulled-up columns are read;
//! a LOW column marks the pressed key.  The scan runs once per control
//! tick, and a key is reported once it reads the same on
//! [`DEBOUNCE_SCANS`] consecutive scans.  Holding a key reports it once.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: scans the matrix through hw_init GPIO helpers.
//! On host/test: keys come from a queue fed by the simulation.

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Key legends by `[row][column]`, as printed on the membrane.
pub const KEYMAP: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'C'],
    ['7', '8', '9', 'B'],
    ['*', '0', '#', 'D'],
];

/// Consecutive identical scans needed before a key counts.
pub const DEBOUNCE_SCANS: u8 = 2;

/// Press-edge detector over raw scan results.
#[derive(Debug, Clone, Default)]
pub struct KeyDebouncer {
    candidate: Option<char>,
    count: u8,
    reported: Option<char>,
}

impl KeyDebouncer {
    pub const fn new() -> Self {
        Self {
            candidate: None,
            count: 0,
            reported: None,
        }
    }

    /// Feed one raw scan; returns a key on its debounced press edge.
    pub fn update(&mut self, raw: Option<char>) -> Option<char> {
        if raw == self.candidate {
            self.count = self.count.saturating_add(1);
        } else {
            self.candidate = raw;
            self.count = 1;
        }

        if self.count >= DEBOUNCE_SCANS && self.candidate != self.reported {
            self.reported = self.candidate;
            return self.candidate;
        }
        None
    }
}

pub struct KeypadDriver {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    debouncer: KeyDebouncer,
    #[cfg(not(target_os = "espidf"))]
    sim_keys: VecDeque<char>,
}

impl Default for KeypadDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypadDriver {
    pub fn new() -> Self {
        Self {
            debouncer: KeyDebouncer::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_keys: VecDeque::new(),
        }
    }

    /// Next debounced key press, if any.
    #[cfg(target_os = "espidf")]
    pub fn next_key(&mut self) -> Option<char> {
        let raw = Self::scan();
        self.debouncer.update(raw)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn next_key(&mut self) -> Option<char> {
        self.sim_keys.pop_front()
    }

    #[cfg(target_os = "espidf")]
    fn scan() -> Option<char> {
        let mut found = None;
        for (r, &row) in pins::KEYPAD_ROW_GPIOS.iter().enumerate() {
            for &other in &pins::KEYPAD_ROW_GPIOS {
                hw_init::gpio_write(other, other != row);
            }
            // SAFETY: busy-wait for the column lines to settle.
            unsafe { esp_idf_svc::sys::esp_rom_delay_us(5) };
            for (c, &col) in pins::KEYPAD_COL_GPIOS.iter().enumerate() {
                if found.is_none() && !hw_init::gpio_read(col) {
                    found = Some(KEYMAP[r][c]);
                }
            }
        }
        for &row in &pins::KEYPAD_ROW_GPIOS {
            hw_init::gpio_write(row, true);
        }
        found
    }
}

#[cfg(not(target_os = "espidf"))]
impl KeypadDriver {
    /// Queue key presses as if typed on the membrane.
    pub fn sim_type(&mut self, keys: &str) {
        self.sim_keys.extend(keys.chars());
    }

    pub fn sim_pending(&self) -> usize {
        self.sim_keys.len()
    }
}
