//! System configuration parameters
//!
//! All tunable parameters for the VentFan controller.  Fan levels are
//! specified the way the hardware is characterised: as the voltage seen by
//! the fan on a 12 V rail, converted once to 8-bit PWM duty via
//! [`FanConfig::levels`].  Values are compile-time defaults; the host
//! simulator may override them from a JSON file.

use serde::{Deserialize, Serialize};

use crate::control::ramp;
use crate::control::{DUTY_MAX, DutyValue};
use crate::error::ConfigError;

/// Core fan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    // --- Electrical ---
    /// Fan voltage corresponding to full duty (mV)
    pub fan_max_mv: u16,
    /// Lowest voltage at which the fan reliably spins (mV)
    pub low_threshold_mv: u16,

    // --- Continuous mode ---
    /// Fan voltage for intensity Low (mV); must not be below the threshold
    pub continuous_low_mv: u16,
    /// Fan voltage for intensity Medium (mV)
    pub continuous_medium_mv: u16,
    /// Fan voltage for intensity High (mV)
    pub continuous_high_mv: u16,

    // --- Interval mode ---
    /// Fan voltage during the ON phase (mV)
    pub interval_on_mv: u16,
    /// ON phase length (seconds)
    pub interval_on_secs: u32,
    /// Pause after an ON phase at intensity High (seconds)
    pub pause_short_secs: u32,
    /// Pause at intensity Medium (seconds)
    pub pause_medium_secs: u32,
    /// Pause at intensity Low (seconds)
    pub pause_long_secs: u32,

    // --- Soft start / stop ---
    /// Time to ramp from the stall threshold to full duty (milliseconds)
    pub start_duration_ms: u32,
    /// Time to ramp from full duty down to the stall threshold (milliseconds)
    pub stop_duration_ms: u32,
    /// Ramp tick period (milliseconds)
    pub control_cycle_ms: u32,
    /// Invert the status LED on every ramp step
    pub blink_during_ramp: bool,

    // --- Pause blip ---
    /// LED on-time of each pause blip (milliseconds)
    pub blip_on_ms: u32,
    /// Period between pause blips (milliseconds)
    pub blip_period_ms: u32,

    // --- Inputs ---
    /// Switch debounce window (milliseconds)
    pub switch_debounce_ms: u32,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            // Electrical
            fan_max_mv: 13_000,
            low_threshold_mv: 4_400,

            // Continuous
            continuous_low_mv: 4_400,
            continuous_medium_mv: 9_000,
            continuous_high_mv: 13_000,

            // Interval
            interval_on_mv: 13_000,
            interval_on_secs: 300,       // 5 min
            pause_short_secs: 60,        // 1 min
            pause_medium_secs: 600,      // 10 min
            pause_long_secs: 3_600 - 300, // once per hour including the ON phase

            // Soft start / stop
            start_duration_ms: 6_000,
            stop_duration_ms: 8_000,
            control_cycle_ms: 200,
            blink_during_ramp: true,

            // Pause blip
            blip_on_ms: 200,
            blip_period_ms: 5_000,

            // Inputs
            switch_debounce_ms: 50,
        }
    }
}

/// Duty levels derived from a [`FanConfig`].  Computed once at startup so
/// the state machine never does voltage arithmetic on the hot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyLevels {
    /// Stall threshold; ramps toward ON start here and full stops pass it.
    pub low_threshold: DutyValue,
    pub continuous_low: DutyValue,
    pub continuous_medium: DutyValue,
    pub continuous_high: DutyValue,
    pub interval_on: DutyValue,
    /// Duty increment per control cycle while speeding up.
    pub start_step: DutyValue,
    /// Duty decrement per control cycle while slowing down.
    pub stop_step: DutyValue,
}

/// Convert a fan voltage to 8-bit duty relative to `max_mv`.
/// Voltages above `max_mv` saturate at [`DUTY_MAX`].
pub fn duty_for_millivolts(mv: u16, max_mv: u16) -> DutyValue {
    if max_mv == 0 {
        return 0;
    }
    let mv = u32::from(mv.min(max_mv));
    (mv * u32::from(DUTY_MAX) / u32::from(max_mv)) as DutyValue
}

impl FanConfig {
    /// Derive the duty table used by the fan engine.
    pub fn levels(&self) -> DutyLevels {
        let duty = |mv| duty_for_millivolts(mv, self.fan_max_mv);
        let low_threshold = duty(self.low_threshold_mv);
        DutyLevels {
            low_threshold,
            continuous_low: duty(self.continuous_low_mv),
            continuous_medium: duty(self.continuous_medium_mv),
            continuous_high: duty(self.continuous_high_mv),
            interval_on: duty(self.interval_on_mv),
            start_step: ramp::step_per_cycle(low_threshold, self.control_cycle_ms, self.start_duration_ms),
            stop_step: ramp::step_per_cycle(low_threshold, self.control_cycle_ms, self.stop_duration_ms),
        }
    }

    /// ON phase length in milliseconds.
    pub fn interval_on_ms(&self) -> u64 {
        u64::from(self.interval_on_secs) * 1000
    }

    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fan_max_mv == 0 {
            return Err(ConfigError::ValidationFailed("fan_max_mv must be non-zero"));
        }
        if self.low_threshold_mv == 0 || self.low_threshold_mv > self.fan_max_mv {
            return Err(ConfigError::ValidationFailed(
                "low_threshold_mv must be in 1..=fan_max_mv",
            ));
        }
        if self.continuous_low_mv < self.low_threshold_mv {
            return Err(ConfigError::ValidationFailed(
                "continuous_low_mv below stall threshold",
            ));
        }
        if !(self.continuous_low_mv <= self.continuous_medium_mv
            && self.continuous_medium_mv <= self.continuous_high_mv
            && self.continuous_high_mv <= self.fan_max_mv)
        {
            return Err(ConfigError::ValidationFailed(
                "continuous levels must satisfy low <= medium <= high <= fan_max_mv",
            ));
        }
        if self.interval_on_mv < self.low_threshold_mv || self.interval_on_mv > self.fan_max_mv {
            return Err(ConfigError::ValidationFailed(
                "interval_on_mv must be between stall threshold and fan_max_mv",
            ));
        }
        if self.interval_on_secs == 0 {
            return Err(ConfigError::ValidationFailed("interval_on_secs must be non-zero"));
        }
        if !(self.pause_short_secs <= self.pause_medium_secs
            && self.pause_medium_secs <= self.pause_long_secs)
        {
            return Err(ConfigError::ValidationFailed(
                "pauses must satisfy short <= medium <= long",
            ));
        }
        if self.control_cycle_ms == 0 {
            return Err(ConfigError::ValidationFailed("control_cycle_ms must be non-zero"));
        }
        if self.start_duration_ms < self.control_cycle_ms
            || self.stop_duration_ms < self.control_cycle_ms
        {
            return Err(ConfigError::ValidationFailed(
                "start/stop durations shorter than one control cycle",
            ));
        }
        if self.blip_on_ms == 0 || self.blip_on_ms >= self.blip_period_ms {
            return Err(ConfigError::ValidationFailed(
                "blip_on_ms must be in 1..blip_period_ms",
            ));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON override and validate the result.
    /// Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            line: e.line(),
            column: e.column(),
        })?;
        config.validate()?;
        Ok(config)
    }
}
