//! VentFan firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod power;

// Hardware-facing modules; the real implementations are guarded by cfg
// attributes inside and fall back to simulated pins on the host.
pub mod adapters;
pub mod drivers;
