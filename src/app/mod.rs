//! Application core: port traits and the messages that cross them.
//!
//! The controller services in [`crate::lock`] and [`crate::bridge`]
//! contain the business rules.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping the domain
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
