//! Lock board adapter: bridges the lock peripherals to the domain ports.
//!
//! Owns the servo, buzzer, LCD, keypad, door reed and indicator drivers
//! plus the signal lines and the serial link, exposing them through the
//! lock-side port traits (and therefore [`LockHardware`]).  This is the
//! only lock-side module that touches hardware.
//!
//! [`LockHardware`]: crate::app::ports::LockHardware

use crate::app::ports::{
    ActuatorPort, BuzzerPort, DisplayPort, DoorSensorPort, KeypadPort, LockPosition,
    SerialPort, SignalOutPort, Tone,
};
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::indicator::{DoorReed, IndicatorLed};
use crate::drivers::keypad::KeypadDriver;
use crate::drivers::lcd::LcdDriver;
use crate::drivers::servo::ServoDriver;
use crate::protocol::SignalCode;

/// Concrete adapter that combines all lock hardware behind port traits.
pub struct LockBoard<S: SerialPort, O: SignalOutPort> {
    pub servo: ServoDriver,
    pub buzzer: BuzzerDriver,
    pub lcd: LcdDriver,
    pub keypad: KeypadDriver,
    pub door: DoorReed,
    pub indicator: IndicatorLed,
    serial: S,
    signal: O,
}

impl<S: SerialPort, O: SignalOutPort> LockBoard<S, O> {
    /// Build the board and bring up the display.
    pub fn new(serial: S, signal: O) -> Self {
        let mut lcd = LcdDriver::new();
        lcd.init();
        Self {
            servo: ServoDriver::new(),
            buzzer: BuzzerDriver::new(),
            lcd,
            keypad: KeypadDriver::new(),
            door: DoorReed::new(),
            indicator: IndicatorLed::new(),
            serial,
            signal,
        }
    }
}

impl<S: SerialPort, O: SignalOutPort> ActuatorPort for LockBoard<S, O> {
    fn move_to(&mut self, position: LockPosition) {
        self.servo.set_angle(position.angle_deg());
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.set(on);
    }
}

impl<S: SerialPort, O: SignalOutPort> BuzzerPort for LockBoard<S, O> {
    fn beep(&mut self, tone: Tone) {
        self.buzzer.play(tone);
    }
}

impl<S: SerialPort, O: SignalOutPort> DisplayPort for LockBoard<S, O> {
    fn render(&mut self, line1: &str, line2: &str) {
        self.lcd.show(line1, line2);
    }
}

impl<S: SerialPort, O: SignalOutPort> KeypadPort for LockBoard<S, O> {
    fn next_key(&mut self) -> Option<char> {
        self.keypad.next_key()
    }
}

impl<S: SerialPort, O: SignalOutPort> DoorSensorPort for LockBoard<S, O> {
    fn is_closed(&self) -> bool {
        self.door.is_closed()
    }
}

impl<S: SerialPort, O: SignalOutPort> SignalOutPort for LockBoard<S, O> {
    fn write_signal(&mut self, code: SignalCode) {
        self.signal.write_signal(code);
    }
}

impl<S: SerialPort, O: SignalOutPort> SerialPort for LockBoard<S, O> {
    fn read_byte(&mut self) -> Option<u8> {
        self.serial.read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.serial.write_bytes(bytes);
    }
}
