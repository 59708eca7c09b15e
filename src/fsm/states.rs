//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.  Guards read the switch snapshot in the context,
//! never an event payload.
//!
//! ```text
//!         ┌──[mode on]──▶ SPEEDING_UP ──[target reached]──▶ STEADY
//!         │                 │    ▲                            │
//!        OFF         [mode off / lower]  [higher]   [mode off / lower /
//!         ▲                 ▼    │                   interval ON over]
//!         │              SLOWING_DOWN ◀────────────────────────┘
//!         │                 │
//!         └──[reached, off] ┤
//!                           └──[reached, interval]──▶ PAUSING
//!                                                       │
//!                    SPEEDING_UP ◀──[pause over / continuous]
//! ```

use core::cmp::Ordering;

use log::{debug, info};

use super::context::{FanContext, Mode};
use super::{Event, FanState, StateDescriptor};
use crate::control::DUTY_MIN;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; FanState::COUNT] {
    [
        // Index 0 — Off
        StateDescriptor {
            id: FanState::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_exit: None,
            on_event: off_event,
        },
        // Index 1 — SpeedingUp
        StateDescriptor {
            id: FanState::SpeedingUp,
            name: "SpeedingUp",
            on_enter: None,
            on_exit: None,
            on_event: speeding_up_event,
        },
        // Index 2 — Steady
        StateDescriptor {
            id: FanState::Steady,
            name: "Steady",
            on_enter: Some(steady_enter),
            on_exit: None,
            on_event: steady_event,
        },
        // Index 3 — SlowingDown
        StateDescriptor {
            id: FanState::SlowingDown,
            name: "SlowingDown",
            on_enter: None,
            on_exit: None,
            on_event: slowing_down_event,
        },
        // Index 4 — Pausing
        StateDescriptor {
            id: FanState::Pausing,
            name: "Pausing",
            on_enter: Some(pausing_enter),
            on_exit: Some(pausing_exit),
            on_event: pausing_event,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF state
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut FanContext) {
    ctx.fan_off();
    ctx.commands.status_led = false;
    ctx.interval.reset();
    info!("OFF: fan unpowered");
}

fn off_event(ctx: &mut FanContext, event: Event) -> Option<FanState> {
    match event {
        Event::ModeChanged if ctx.switches.mode.is_running() => {
            ctx.fan_on();
            ctx.interval.begin_phase(ctx.now_ms);
            info!(
                "OFF: {} mode, ramping {} -> {}",
                ctx.switches.mode.name(),
                ctx.applied_duty(),
                ctx.target_duty()
            );
            Some(FanState::SpeedingUp)
        }
        // Intensity is latched by the switch driver and used on the next start.
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SPEEDING_UP state — soft start toward the target
// ═══════════════════════════════════════════════════════════════════════════

fn speeding_up_event(ctx: &mut FanContext, event: Event) -> Option<FanState> {
    match event {
        Event::ModeChanged if !ctx.switches.mode.is_running() => {
            ctx.retarget(DUTY_MIN);
            Some(FanState::SlowingDown)
        }
        Event::IntensityChanged if ctx.switches.mode == Mode::Continuous => {
            let target = ctx.continuous_target();
            let next = match target.cmp(&ctx.applied_duty()) {
                Ordering::Greater => None,
                Ordering::Less => Some(FanState::SlowingDown),
                Ordering::Equal => Some(FanState::Steady),
            };
            ctx.retarget(target);
            debug!("SPEEDING_UP: retarget -> {}", target);
            next
        }
        Event::TargetSpeedReached if ctx.ramp_reached(true) => {
            ctx.interval.begin_phase(ctx.now_ms);
            Some(FanState::Steady)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  STEADY state — holding speed
// ═══════════════════════════════════════════════════════════════════════════

fn steady_enter(ctx: &mut FanContext) {
    ctx.end_ramp();
    ctx.commands.status_led = false;
    info!("STEADY: holding duty {}", ctx.applied_duty());
}

fn steady_event(ctx: &mut FanContext, event: Event) -> Option<FanState> {
    match event {
        Event::ModeChanged if !ctx.switches.mode.is_running() => {
            ctx.retarget(DUTY_MIN);
            Some(FanState::SlowingDown)
        }
        Event::IntensityChanged if ctx.switches.mode == Mode::Continuous => {
            let target = ctx.continuous_target();
            match target.cmp(&ctx.applied_duty()) {
                Ordering::Greater => {
                    ctx.retarget(target);
                    Some(FanState::SpeedingUp)
                }
                Ordering::Less => {
                    ctx.retarget(target);
                    Some(FanState::SlowingDown)
                }
                Ordering::Equal => None,
            }
        }
        Event::IntervalPhaseEnded if ctx.switches.mode == Mode::Interval => {
            ctx.retarget(DUTY_MIN);
            ctx.interval.begin_phase(ctx.now_ms);
            info!("STEADY: interval ON phase over, stopping");
            Some(FanState::SlowingDown)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLOWING_DOWN state — soft stop toward the target
// ═══════════════════════════════════════════════════════════════════════════

fn slowing_down_event(ctx: &mut FanContext, event: Event) -> Option<FanState> {
    match event {
        Event::ModeChanged if !ctx.switches.mode.is_running() => {
            ctx.retarget(DUTY_MIN);
            None
        }
        Event::IntensityChanged if ctx.switches.mode == Mode::Continuous => {
            let target = ctx.continuous_target();
            let next = match target.cmp(&ctx.applied_duty()) {
                Ordering::Greater => Some(FanState::SpeedingUp),
                Ordering::Less => None,
                // Settle where we are rather than continuing toward an older target.
                Ordering::Equal => Some(FanState::Steady),
            };
            ctx.retarget(target);
            debug!("SLOWING_DOWN: retarget -> {}", target);
            next
        }
        Event::TargetSpeedReached if ctx.ramp_reached(false) => match ctx.switches.mode {
            Mode::Continuous => Some(FanState::Steady),
            Mode::Interval => Some(FanState::Pausing),
            Mode::Off | Mode::Undefined => Some(FanState::Off),
        },
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  PAUSING state — interval mode, fan stopped between ON phases
// ═══════════════════════════════════════════════════════════════════════════

fn pausing_enter(ctx: &mut FanContext) {
    ctx.fan_off();
    ctx.commands.status_led = false;
    let pause = ctx.pause_duration();
    ctx.interval.begin_pause(ctx.now_ms, pause);
    info!(
        "PAUSING: {}s at intensity {}",
        pause / 1000,
        ctx.switches.intensity.name()
    );
}

fn pausing_exit(ctx: &mut FanContext) {
    // A blip may be lit when the pause ends.
    ctx.commands.status_led = false;
}

fn pausing_event(ctx: &mut FanContext, event: Event) -> Option<FanState> {
    match event {
        Event::ModeChanged => match ctx.switches.mode {
            Mode::Off | Mode::Undefined => Some(FanState::Off),
            Mode::Continuous => {
                ctx.fan_on();
                Some(FanState::SpeedingUp)
            }
            Mode::Interval => None,
        },
        Event::IntensityChanged if ctx.switches.mode.is_running() => {
            let pause = ctx.pause_duration();
            ctx.interval.set_pause_duration(pause);
            if ctx.interval.pause_elapsed(ctx.now_ms) {
                info!("PAUSING: shortened pause already elapsed, resuming");
                resume_interval(ctx);
                Some(FanState::SpeedingUp)
            } else {
                debug!(
                    "PAUSING: pause now {}s, {}ms left",
                    pause / 1000,
                    ctx.interval.remaining_ms(ctx.now_ms, pause)
                );
                None
            }
        }
        Event::IntervalPhaseEnded if ctx.switches.mode.is_running() => {
            resume_interval(ctx);
            Some(FanState::SpeedingUp)
        }
        _ => None,
    }
}

/// Start the next ON phase.
fn resume_interval(ctx: &mut FanContext) {
    ctx.fan_on();
    ctx.interval.begin_phase(ctx.now_ms);
}
