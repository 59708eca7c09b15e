//! Fan control primitives — pure functions and small value types.
//!
//! | Module     | Responsibility                                        |
//! |------------|-------------------------------------------------------|
//! | `levels`   | intensity → continuous duty, intensity → pause length |
//! | `ramp`     | soft start / soft stop duty stepping                  |
//! | `interval` | ON / PAUSE phase timing and the pause blip            |
//!
//! Nothing here touches hardware or owns state machine state; the
//! [`fsm`](crate::fsm) drives these from its handlers.

pub mod interval;
pub mod levels;
pub mod ramp;

/// PWM on-fraction driving fan speed (8-bit LEDC resolution).
pub type DutyValue = u8;

/// Fan off.
pub const DUTY_MIN: DutyValue = 0;
/// Full speed.
pub const DUTY_MAX: DutyValue = u8::MAX;
