//! Signal-line adapters over `embedded-hal` digital pins.
//!
//! The lock drives three GPIOs, the bridge samples three GPIOs, and the
//! pins are wired straight across:
//!
//! ```text
//!   lock  REG ──────────▶ REG  bridge
//!         TMP ──────────▶ TMP
//!         LCK ──────────▶ LCK
//! ```
//!
//! [`SignalLines`] / [`SignalSampler`] are generic over the HAL pin
//! traits, so the same code runs on ESP-IDF GPIO drivers and on
//! [`SimWire`] pins in host builds.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::warn;

use crate::app::ports::{SignalInPort, SignalOutPort};
use crate::protocol::SignalCode;

// ── Driving side ──────────────────────────────────────────────

/// Three output pins in `[registration, tamper, lock_status]` order.
pub struct SignalLines<P: OutputPin> {
    pins: [P; 3],
}

impl<P: OutputPin> SignalLines<P> {
    pub fn new(registration: P, tamper: P, lock_status: P) -> Self {
        Self {
            pins: [registration, tamper, lock_status],
        }
    }
}

impl<P: OutputPin> SignalOutPort for SignalLines<P> {
    fn write_signal(&mut self, code: SignalCode) {
        for (pin, level) in self.pins.iter_mut().zip(code.lines()) {
            let res = if level { pin.set_high() } else { pin.set_low() };
            if let Err(e) = res {
                warn!("SIGNAL: pin write failed: {:?}", e);
            }
        }
    }
}

// ── Sampling side ─────────────────────────────────────────────

/// Three input pins in `[registration, tamper, lock_status]` order.
pub struct SignalSampler<P: InputPin> {
    pins: [P; 3],
}

impl<P: InputPin> SignalSampler<P> {
    pub fn new(registration: P, tamper: P, lock_status: P) -> Self {
        Self {
            pins: [registration, tamper, lock_status],
        }
    }
}

impl<P: InputPin> SignalInPort for SignalSampler<P> {
    /// A pin that cannot be read counts as low.
    fn sample_signal(&mut self) -> u8 {
        let mut levels = [false; 3];
        for (level, pin) in levels.iter_mut().zip(self.pins.iter_mut()) {
            *level = pin.is_high().unwrap_or_else(|e| {
                warn!("SIGNAL: pin read failed: {:?}", e);
                false
            });
        }
        SignalCode::pack(levels[0], levels[1], levels[2])
    }
}

// ── Simulated wire ────────────────────────────────────────────

/// One end of a simulated wire.  Both ends share the level.
#[derive(Debug, Clone, Default)]
pub struct SimWire {
    level: Rc<Cell<bool>>,
}

impl SimWire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> bool {
        self.level.get()
    }
}

impl ErrorType for SimWire {
    type Error = Infallible;
}

impl OutputPin for SimWire {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(true);
        Ok(())
    }
}

impl InputPin for SimWire {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

/// Three wires connecting a [`SignalLines`] to a [`SignalSampler`].
pub fn sim_signal_bus() -> (SignalLines<SimWire>, SignalSampler<SimWire>) {
    let wires = [SimWire::new(), SimWire::new(), SimWire::new()];
    let [r, t, l] = wires.clone();
    let [r2, t2, l2] = wires;
    (SignalLines::new(r, t, l), SignalSampler::new(r2, t2, l2))
}
