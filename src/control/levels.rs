//! Intensity lookup tables.
//!
//! Two total functions over [`Intensity`]: the continuous-mode target duty
//! and the interval-mode pause length.  Anything unexpected maps to the
//! gentlest setting (low duty, long pause); full power is never chosen on an
//! ambiguous reading.

use crate::config::{DutyLevels, FanConfig};
use crate::fsm::context::Intensity;

use super::DutyValue;

/// Continuous-mode target duty for the given intensity.
pub fn target_duty_for_continuous(intensity: Intensity, levels: &DutyLevels) -> DutyValue {
    match intensity {
        Intensity::High => levels.continuous_high,
        Intensity::Medium => levels.continuous_medium,
        Intensity::Low | Intensity::Undefined => levels.continuous_low,
    }
}

/// Interval-mode pause length (ms) for the given intensity.
/// Higher intensity means a shorter pause.
pub fn pause_duration_for(intensity: Intensity, config: &FanConfig) -> u64 {
    let secs = match intensity {
        Intensity::High => config.pause_short_secs,
        Intensity::Medium => config.pause_medium_secs,
        Intensity::Low | Intensity::Undefined => config.pause_long_secs,
    };
    u64::from(secs) * 1000
}
