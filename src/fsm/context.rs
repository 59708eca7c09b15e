//! Shared mutable context threaded through every FSM handler.
//!
//! `FanContext` is the single struct that state handlers read from and
//! write to.  It holds the switch snapshot for the event being handled, the
//! output commands, the in-flight ramp, interval phase timing, and the
//! configuration.  Think of it as the "blackboard" in a blackboard
//! architecture: handlers never touch hardware, the service applies
//! `commands` after each event.

use log::debug;

use crate::config::{DutyLevels, FanConfig};
use crate::control::interval::IntervalTracker;
use crate::control::levels::{pause_duration_for, target_duty_for_continuous};
use crate::control::ramp::{self, Ramp};
use crate::control::{DUTY_MAX, DUTY_MIN, DutyValue};

// ---------------------------------------------------------------------------
// Switch positions
// ---------------------------------------------------------------------------

/// Mode switch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Boot placeholder before the first switch read.
    #[default]
    Undefined,
    Off,
    Continuous,
    Interval,
}

impl Mode {
    /// Whether this mode wants the fan to run.  `Undefined` does not.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Continuous | Self::Interval)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Off => "Off",
            Self::Continuous => "Continuous",
            Self::Interval => "Interval",
        }
    }
}

/// Intensity switch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Intensity {
    /// Boot placeholder before the first switch read.
    #[default]
    Undefined,
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Switch positions copied once per event so a handler never sees a torn
/// reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwitchSnapshot {
    pub mode: Mode,
    pub intensity: Intensity,
}

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Desired levels of the three outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCommands {
    /// PWM duty applied to the fan.
    pub duty: DutyValue,
    /// Fan supply enable.
    pub power: bool,
    /// Status LED level.
    pub status_led: bool,
}

impl OutputCommands {
    /// Fan stopped, LED dark.
    pub fn all_off() -> Self {
        Self::default()
    }

    /// PWM output is neither fully off nor fully on, so the timer driving
    /// it must keep running.
    pub fn is_pwm_active(&self) -> bool {
        self.duty > DUTY_MIN && self.duty < DUTY_MAX
    }
}

// ---------------------------------------------------------------------------
// FanContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FanContext {
    // -- Timing --
    /// Monotonic time of the event being handled (ms).
    pub now_ms: u64,

    // -- Inputs --
    /// Switch positions at the time of the event.
    pub switches: SwitchSnapshot,

    // -- Outputs --
    /// Commands to be applied after the handler returns.
    pub commands: OutputCommands,

    // -- Engine state --
    /// In-flight ramp; `None` outside `SpeedingUp` / `SlowingDown`.
    pub ramp: Option<Ramp>,
    /// Interval-mode phase timing.
    pub interval: IntervalTracker,

    // -- Configuration --
    pub config: FanConfig,
    /// Duty table derived from `config`.
    pub levels: DutyLevels,
}

impl FanContext {
    /// Create a new context with the given configuration.
    pub fn new(config: FanConfig) -> Self {
        let levels = config.levels();
        Self {
            now_ms: 0,
            switches: SwitchSnapshot::default(),
            commands: OutputCommands::all_off(),
            ramp: None,
            interval: IntervalTracker::new(),
            config,
            levels,
        }
    }

    /// Duty currently on the output.
    pub fn applied_duty(&self) -> DutyValue {
        self.commands.duty
    }

    /// Duty the machine is heading for.  Equal to the applied duty when no
    /// ramp is in flight.
    pub fn target_duty(&self) -> DutyValue {
        self.ramp.map_or(self.commands.duty, |r| r.target_duty)
    }

    /// Continuous-mode duty for the current intensity.
    pub fn continuous_target(&self) -> DutyValue {
        target_duty_for_continuous(self.switches.intensity, &self.levels)
    }

    /// Target for a fan that is being switched on in the current mode.
    pub fn running_target(&self) -> DutyValue {
        match self.switches.mode {
            Mode::Interval => self.levels.interval_on,
            _ => self.continuous_target(),
        }
    }

    /// Pause length for the current intensity (ms).
    pub fn pause_duration(&self) -> u64 {
        pause_duration_for(self.switches.intensity, &self.config)
    }

    /// Aim the ramp at `target`.  An in-flight ramp is retargeted in place
    /// so stepping continues from the applied duty; otherwise a new ramp
    /// starts now.  A rising ramp below the stall threshold jumps to the
    /// threshold first.
    pub fn retarget(&mut self, target: DutyValue) {
        if target > self.commands.duty && self.commands.duty < self.levels.low_threshold {
            self.commands.duty = self.levels.low_threshold.min(target);
        }
        match self.ramp.as_mut() {
            Some(r) => r.target_duty = target,
            None => self.ramp = Some(Ramp::new(self.commands.duty, target, self.now_ms)),
        }
    }

    /// Power the fan and ramp from the stall threshold toward the target
    /// for the current mode.
    pub fn fan_on(&mut self) {
        self.commands.power = true;
        self.commands.duty = self.commands.duty.max(self.levels.low_threshold);
        self.ramp = None;
        let target = self.running_target();
        self.retarget(target);
    }

    /// Cut power and duty.
    pub fn fan_off(&mut self) {
        self.commands.power = false;
        self.commands.duty = DUTY_MIN;
        self.ramp = None;
    }

    /// Drop the in-flight ramp; the applied duty becomes the target.
    pub fn end_ramp(&mut self) {
        self.ramp = None;
    }

    /// Apply every ramp step that is due.  Returns `true` once the applied
    /// duty meets the target (`>=` when `rising`, `<=` otherwise).
    pub fn advance_ramp(&mut self, rising: bool) -> bool {
        let Some(mut r) = self.ramp else {
            return false;
        };
        let mut due = r.steps_due(self.now_ms, self.config.control_cycle_ms);
        let mut reached = self.ramp_reached(rising);
        let stepped = due > 0 && !reached;
        while due > 0 && !reached {
            self.commands.duty = if rising {
                ramp::step_up(self.commands.duty, r.target_duty, self.levels.start_step)
            } else {
                ramp::step_down(
                    self.commands.duty,
                    r.target_duty,
                    self.levels.stop_step,
                    self.levels.low_threshold,
                )
            };
            r.last_step_ms = r.last_step_ms.saturating_add(u64::from(self.config.control_cycle_ms));
            reached = self.ramp_reached(rising);
            if !reached && self.config.blink_during_ramp {
                self.commands.status_led = !self.commands.status_led;
            }
            due -= 1;
        }
        if stepped && reached {
            debug!(
                "ramp {} -> {} done in {} ms",
                r.start_duty,
                r.target_duty,
                r.elapsed_ms(self.now_ms)
            );
        }
        self.ramp = Some(r);
        reached
    }

    /// Whether the applied duty has met the ramp target.
    pub fn ramp_reached(&self, rising: bool) -> bool {
        let target = self.target_duty();
        if rising {
            self.commands.duty >= target
        } else {
            self.commands.duty <= target
        }
    }
}
