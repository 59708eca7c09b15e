//! Application service — the hexagonal core.
//!
//! [`FanService`] owns the FSM and shared context.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!    SwitchPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                   │       FanService        │
//! FanOutputPort ◀── │  FSM · Ramp · Interval  │ ──▶ next_wake_in()
//!                   └────────────────────────┘
//! ```
//!
//! Two entry points mutate state: [`FanService::handle_event`] for switch
//! changes and [`FanService::tick`] for ramp steps and phase checks.  Both
//! run to completion and write only the outputs that changed.

use log::{debug, info};

use crate::config::FanConfig;
use crate::control::DutyValue;
use crate::control::ramp::Ramp;
use crate::fsm::context::{FanContext, Intensity, Mode, OutputCommands, SwitchSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{Event, FanState, Fsm, Transition};

use super::events::AppEvent;
use super::ports::{EventSink, FanOutputPort, SwitchPort};

// ───────────────────────────────────────────────────────────────
// FanService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct FanService {
    fsm: Fsm,
    ctx: FanContext,
    /// Last commands written to the outputs; `None` before the first write.
    written: Option<OutputCommands>,
}

impl FanService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: FanConfig) -> Self {
        let ctx = FanContext::new(config);
        let fsm = Fsm::new(build_state_table(), FanState::Off);
        Self {
            fsm,
            ctx,
            written: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Off`, drive every output to its safe level, then start the
    /// fan if the switches already select a running mode.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SwitchPort + FanOutputPort),
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.take_snapshot(hw);
        self.fsm.start(&mut self.ctx);
        self.apply_outputs(hw);

        let SwitchSnapshot { mode, intensity } = self.ctx.switches;
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
            mode,
            intensity,
        });
        info!(
            "FanService started: mode={} intensity={}",
            mode.name(),
            intensity.name()
        );

        if mode.is_running() {
            self.dispatch(Event::ModeChanged, hw, sink);
        }
    }

    // ── Event handling ────────────────────────────────────────

    /// Process one event against a fresh switch snapshot.
    ///
    /// The `hw` parameter satisfies **both** [`SwitchPort`] and
    /// [`FanOutputPort`] — this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn handle_event(
        &mut self,
        event: Event,
        now_ms: u64,
        hw: &mut (impl SwitchPort + FanOutputPort),
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        self.advance_clock(now_ms);
        self.take_snapshot(hw);
        self.dispatch(event, hw, sink)
    }

    // ── Periodic work ─────────────────────────────────────────

    /// Run whatever is due at `now_ms`: ramp steps while ramping, the ON
    /// phase check in interval `Steady`, the pause check and LED blip while
    /// pausing.  Safe to call early or late; nothing happens before it is due.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SwitchPort + FanOutputPort),
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        self.advance_clock(now_ms);
        self.take_snapshot(hw);
        let now = self.ctx.now_ms;

        let state = self.fsm.current_state();
        match state {
            FanState::SpeedingUp | FanState::SlowingDown => {
                let before = self.ctx.applied_duty();
                if self.ctx.advance_ramp(state == FanState::SpeedingUp) {
                    return self.dispatch(Event::TargetSpeedReached, hw, sink);
                }
                let duty = self.ctx.applied_duty();
                if duty != before {
                    let target = self.ctx.target_duty();
                    debug!("{}: duty {} -> {} (target {})", state.name(), before, duty, target);
                    sink.emit(&AppEvent::RampStep {
                        state,
                        duty,
                        target,
                    });
                }
                self.apply_outputs(hw);
                None
            }
            FanState::Steady if self.ctx.switches.mode == Mode::Interval => {
                let on_ms = self.ctx.config.interval_on_ms();
                if self.ctx.interval.phase_elapsed(now, on_ms) {
                    self.dispatch(Event::IntervalPhaseEnded, hw, sink)
                } else {
                    None
                }
            }
            FanState::Pausing => {
                if self.ctx.interval.pause_elapsed(now) {
                    return self.dispatch(Event::IntervalPhaseEnded, hw, sink);
                }
                let cfg = &self.ctx.config;
                self.ctx.commands.status_led =
                    self.ctx
                        .interval
                        .blip_led(now, cfg.blip_on_ms, cfg.blip_period_ms);
                self.apply_outputs(hw);
                None
            }
            _ => None,
        }
    }

    /// How long until [`tick`](Self::tick) next has work to do, or `None`
    /// when only a switch change can move the machine.
    pub fn next_wake_in(&self, now_ms: u64) -> Option<u64> {
        let cfg = &self.ctx.config;
        match self.fsm.current_state() {
            FanState::SpeedingUp | FanState::SlowingDown => self
                .ctx
                .ramp
                .map(|r| r.next_step_in(now_ms, cfg.control_cycle_ms)),
            FanState::Steady if self.ctx.switches.mode == Mode::Interval => Some(
                self.ctx
                    .interval
                    .remaining_ms(now_ms, cfg.interval_on_ms()),
            ),
            FanState::Pausing => {
                let interval = &self.ctx.interval;
                let pause_left = interval.remaining_ms(now_ms, interval.pause_duration_ms());
                let blip = interval.next_blip_edge_in(now_ms, cfg.blip_on_ms, cfg.blip_period_ms);
                Some(pause_left.min(blip))
            }
            _ => None,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> FanState {
        self.fsm.current_state()
    }

    /// Duty currently commanded on the PWM output.
    pub fn applied_duty(&self) -> DutyValue {
        self.ctx.applied_duty()
    }

    /// Duty the machine is heading for.
    pub fn target_duty(&self) -> DutyValue {
        self.ctx.target_duty()
    }

    /// The in-flight ramp, if any.
    pub fn ramp(&self) -> Option<Ramp> {
        self.ctx.ramp
    }

    /// Mode seen by the last handled event or tick.
    pub fn mode(&self) -> Mode {
        self.ctx.switches.mode
    }

    /// Intensity seen by the last handled event or tick.
    pub fn intensity(&self) -> Intensity {
        self.ctx.switches.intensity
    }

    /// Length of the current (or last) interval pause.
    pub fn pause_duration_ms(&self) -> u64 {
        self.ctx.interval.pause_duration_ms()
    }

    /// Full output command set as last computed.
    pub fn commands(&self) -> OutputCommands {
        self.ctx.commands
    }

    /// Whether the PWM timer must keep running (partial duty).
    pub fn is_pwm_active(&self) -> bool {
        self.ctx.commands.is_pwm_active()
    }

    pub fn config(&self) -> &FanConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn advance_clock(&mut self, now_ms: u64) {
        // A regressing clock is clamped; timing math relies on monotonic time.
        self.ctx.now_ms = self.ctx.now_ms.max(now_ms);
    }

    fn take_snapshot(&mut self, switches: &impl SwitchPort) {
        self.ctx.switches = SwitchSnapshot {
            mode: switches.current_mode(),
            intensity: switches.current_intensity(),
        };
    }

    fn dispatch(
        &mut self,
        event: Event,
        hw: &mut impl FanOutputPort,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        let transition = self.fsm.dispatch(event, &mut self.ctx);
        self.apply_outputs(hw);

        if let Some(t) = transition {
            sink.emit(&AppEvent::StateChanged {
                from: t.from,
                to: t.to,
                cause: t.cause,
            });
            if t.to == FanState::Pausing {
                sink.emit(&AppEvent::PauseBegun {
                    duration_ms: self.ctx.interval.pause_duration_ms(),
                });
            }
        }
        transition
    }

    /// Translate FSM output commands into port calls.  Only fields that
    /// differ from the last write are touched.
    fn apply_outputs(&mut self, hw: &mut impl FanOutputPort) {
        let cmds = self.ctx.commands;
        let prev = self.written;

        if prev.is_none_or(|p| p.power != cmds.power) {
            hw.set_power(cmds.power);
        }
        if prev.is_none_or(|p| p.duty != cmds.duty) {
            hw.set_duty(cmds.duty);
        }
        if prev.is_none_or(|p| p.status_led != cmds.status_led) {
            hw.set_status_led(cmds.status_led);
        }
        self.written = Some(cmds);
    }
}
