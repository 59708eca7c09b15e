//! Output drivers, switch input, and hardware initialisation.

pub mod fan;
pub mod hw_init;
pub mod status_led;
pub mod switches;
