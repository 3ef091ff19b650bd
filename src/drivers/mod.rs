//! Lock-board drivers, hardware initialisation, and register helpers.

pub mod buzzer;
pub mod hw_init;
pub mod indicator;
pub mod keypad;
pub mod lcd;
pub mod servo;
