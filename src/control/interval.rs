//! Interval-mode phase tracking.
//!
//! ```text
//!   ON phase                    PAUSE
//!  ├──────── interval_on ──────┼──────────── pause_duration ───────────┤
//!                               LED: ·····█·········█·········█·······
//!                                    └ blip_period ┘ (blip_on wide)
//! ```
//!
//! The tracker only measures time against the recorded phase start; the
//! state machine decides when a phase begins and what happens when it ends.

/// Phase timing for interval mode.  Reset on every return to `Off`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalTracker {
    phase_begin_ms: u64,
    pause_duration_ms: u64,
}

impl IntervalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Mark the start of a new phase (fan-on, ON speed reached, stop begun).
    pub fn begin_phase(&mut self, now_ms: u64) {
        self.phase_begin_ms = now_ms;
    }

    /// Mark the start of a pause and fix its length.  The blip schedule is
    /// counted from here.
    pub fn begin_pause(&mut self, now_ms: u64, pause_duration_ms: u64) {
        self.phase_begin_ms = now_ms;
        self.pause_duration_ms = pause_duration_ms;
    }

    /// Replace the pause length (intensity changed mid-pause).
    pub fn set_pause_duration(&mut self, pause_duration_ms: u64) {
        self.pause_duration_ms = pause_duration_ms;
    }

    pub fn phase_begin_ms(&self) -> u64 {
        self.phase_begin_ms
    }

    pub fn pause_duration_ms(&self) -> u64 {
        self.pause_duration_ms
    }

    /// Time spent in the current phase.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.phase_begin_ms)
    }

    /// Whether a phase of `duration_ms` has run its course.
    pub fn phase_elapsed(&self, now_ms: u64, duration_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= duration_ms
    }

    pub fn pause_elapsed(&self, now_ms: u64) -> bool {
        self.phase_elapsed(now_ms, self.pause_duration_ms)
    }

    /// Time left in a phase of `duration_ms` (0 once elapsed).
    pub fn remaining_ms(&self, now_ms: u64, duration_ms: u64) -> u64 {
        duration_ms.saturating_sub(self.elapsed_ms(now_ms))
    }

    /// Pause-blip LED level.  The LED lights for `on_ms` at the start of
    /// every `period_ms` window after the first one.
    pub fn blip_led(&self, now_ms: u64, on_ms: u32, period_ms: u32) -> bool {
        let period = u64::from(period_ms.max(1));
        let into = self.elapsed_ms(now_ms);
        into >= period && into % period < u64::from(on_ms)
    }

    /// Time until the blip LED next changes level.
    pub fn next_blip_edge_in(&self, now_ms: u64, on_ms: u32, period_ms: u32) -> u64 {
        let period = u64::from(period_ms.max(1));
        let into = self.elapsed_ms(now_ms);
        if into < period {
            return period - into;
        }
        let offset = into % period;
        let on = u64::from(on_ms);
        if offset < on { on - offset } else { period - offset }
    }
}
