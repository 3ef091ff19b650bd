//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that drives one controller (or both,
//! wired together) against mock adapters.  All tests run on the host with
//! no real hardware required.

mod bridge_flow_tests;
mod lock_flow_tests;
mod mock_hw;
