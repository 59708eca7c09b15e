//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the fan controller:
//! event dispatch into the FSM, ramp ticking, interval phase checks and
//! wake scheduling.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod events;
pub mod ports;
pub mod service;
