//! Bolt indicator LED and door reed switch.
//!
//! Both are single GPIOs.  On host/test the LED level is tracked in memory
//! and the reed switch reads whatever the simulation last set.

use core::cell::Cell;

use crate::drivers::hw_init;
use crate::pins;

pub struct IndicatorLed {
    on: bool,
}

impl Default for IndicatorLed {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorLed {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::INDICATOR_LED_GPIO, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// Reed switch: LOW = closed (magnet present).
pub struct DoorReed {
    /// Simulated door state (host only).
    sim_closed: Cell<bool>,
}

impl Default for DoorReed {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorReed {
    pub fn new() -> Self {
        Self {
            sim_closed: Cell::new(true),
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn is_closed(&self) -> bool {
        !hw_init::gpio_read(pins::DOOR_REED_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn is_closed(&self) -> bool {
        self.sim_closed.get()
    }

    /// Open or close the simulated door.
    pub fn sim_set_closed(&self, closed: bool) {
        self.sim_closed.set(closed);
    }
}
