//! Active buzzer driver.
//!
//! Tones are short on/off pulses.  On the device the driver blocks for
//! the pulse duration (at most 500 ms), which is the only blocking a lock
//! tick is allowed besides the network join on the bridge.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: toggles the buzzer GPIO and sleeps through each pulse.
//! On host/test: records the tones without sleeping.

use crate::app::ports::Tone;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

pub struct BuzzerDriver {
    played: u32,
    last: Option<Tone>,
}

impl Default for BuzzerDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzerDriver {
    pub fn new() -> Self {
        Self {
            played: 0,
            last: None,
        }
    }

    pub fn play(&mut self, tone: Tone) {
        self.pulse(tone.on_ms(), tone.off_ms());
        self.played = self.played.wrapping_add(1);
        self.last = Some(tone);
    }

    #[cfg(target_os = "espidf")]
    fn pulse(&self, on_ms: u32, off_ms: u32) {
        use std::time::Duration;

        hw_init::gpio_write(pins::BUZZER_GPIO, true);
        std::thread::sleep(Duration::from_millis(u64::from(on_ms)));
        hw_init::gpio_write(pins::BUZZER_GPIO, false);
        if off_ms > 0 {
            std::thread::sleep(Duration::from_millis(u64::from(off_ms)));
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn pulse(&self, on_ms: u32, off_ms: u32) {
        log::debug!("BUZZER(sim): beep {}ms on / {}ms off", on_ms, off_ms);
    }

    /// Tones played since boot.
    pub fn played(&self) -> u32 {
        self.played
    }

    pub fn last_tone(&self) -> Option<Tone> {
        self.last
    }
}
