//! Bolt servo driver (SG90 class, 50 Hz PWM on LEDC CH0).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty via hw_init.
//! On host/test: tracks the commanded angle in-memory only.

use log::debug;

use crate::drivers::hw_init;
use crate::pins;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_STEPS: u32 = 1 << pins::SERVO_PWM_RESOLUTION_BITS;

/// Pulse width for `angle` degrees, clamped to 0–180.
pub const fn pulse_width_us(angle: u8) -> u32 {
    let angle = (if angle > 180 { 180 } else { angle }) as u32;
    pins::SERVO_MIN_PULSE_US + (pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US) * angle / 180
}

/// LEDC duty for `angle` degrees.
pub const fn duty_for_angle(angle: u8) -> u32 {
    pulse_width_us(angle) * DUTY_STEPS / FRAME_US
}

pub struct ServoDriver {
    angle: Option<u8>,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self { angle: None }
    }

    pub fn set_angle(&mut self, angle: u8) {
        let angle = angle.min(180);
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, duty_for_angle(angle));
        debug!("SERVO: {}° (duty={})", angle, duty_for_angle(angle));
        self.angle = Some(angle);
    }

    /// Last commanded angle, `None` before the first move.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
