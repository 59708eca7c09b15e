//! Soft start / soft stop duty stepping.
//!
//! Driven by the control tick while a ramp is in flight.  Each cycle moves
//! the applied duty toward the target by a fixed step derived from the
//! configured full-scale ramp duration:
//!
//! ```text
//!   step = (DUTY_MAX - low_threshold) * T_cycle / T_start_or_stop
//!
//!  duty
//!   ▲        ┌──────── target            ──┐
//!   │      ┌─┘                               └─┐
//!   │    ┌─┘                                   └─┐
//!   │  ┌─┘                                       └─┐ low_threshold
//!   │──┘ low_threshold                             └──  then cut to 0
//!   └──────────────────────────▶ t
//! ```
//!
//! Stepping never crosses the target and saturates at the `u8` bounds.

use super::{DUTY_MAX, DutyValue};

/// An in-flight ramp.  Alive only while the fan is speeding up or slowing
/// down; retargeting mutates `target_duty` in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ramp {
    /// Applied duty when the ramp began.
    pub start_duty: DutyValue,
    /// Duty the ramp is heading for.
    pub target_duty: DutyValue,
    /// Monotonic time the ramp began (ms).
    pub started_ms: u64,
    /// Monotonic time of the last applied step (ms).
    pub last_step_ms: u64,
}

impl Ramp {
    pub fn new(start_duty: DutyValue, target_duty: DutyValue, now_ms: u64) -> Self {
        Self {
            start_duty,
            target_duty,
            started_ms: now_ms,
            last_step_ms: now_ms,
        }
    }

    /// Whole control cycles elapsed since the last step.
    pub fn steps_due(&self, now_ms: u64, cycle_ms: u32) -> u64 {
        now_ms.saturating_sub(self.last_step_ms) / u64::from(cycle_ms.max(1))
    }

    /// Milliseconds until the next step is due (0 if overdue).
    pub fn next_step_in(&self, now_ms: u64, cycle_ms: u32) -> u64 {
        let next = self.last_step_ms.saturating_add(u64::from(cycle_ms));
        next.saturating_sub(now_ms)
    }

    /// Time spent ramping so far.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }
}

/// Duty change per control cycle for a full-scale ramp of `duration_ms`.
/// Never zero, so every ramp terminates.
pub fn step_per_cycle(low_threshold: DutyValue, cycle_ms: u32, duration_ms: u32) -> DutyValue {
    if duration_ms == 0 {
        return DUTY_MAX;
    }
    let span = u64::from(DUTY_MAX.saturating_sub(low_threshold));
    let step = span * u64::from(cycle_ms) / u64::from(duration_ms);
    step.clamp(1, u64::from(DUTY_MAX)) as DutyValue
}

/// Next duty while speeding up.  Returns `current` unchanged if it already
/// meets the target.
pub fn step_up(current: DutyValue, target: DutyValue, step: DutyValue) -> DutyValue {
    if current >= target {
        return current;
    }
    current.saturating_add(step).min(target)
}

/// Next duty while slowing down.
///
/// Above the stall threshold the duty falls by `step` but not below
/// `max(target, low_threshold)`.  Once at (or below) the threshold with a
/// lower target, the duty jumps straight to the target.
pub fn step_down(
    current: DutyValue,
    target: DutyValue,
    step: DutyValue,
    low_threshold: DutyValue,
) -> DutyValue {
    if current <= target {
        return current;
    }
    if current <= low_threshold {
        return target;
    }
    current.saturating_sub(step).max(target.max(low_threshold))
}
