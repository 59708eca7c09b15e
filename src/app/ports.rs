//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FanService (domain)
//! ```
//!
//! Driven adapters (switches, fan output, clock, sleep, event sinks)
//! implement these traits.  The [`FanService`](super::service::FanService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! Output ports are infallible from the domain's point of view: adapters
//! log and degrade on driver failure, the state machine never sees it.

use crate::control::DutyValue;
use crate::fsm::context::{Intensity, Mode};

// ───────────────────────────────────────────────────────────────
// Switch port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: debounced positions of the two tri-state switches.
pub trait SwitchPort {
    fn current_mode(&self) -> Mode;

    fn current_intensity(&self) -> Intensity;
}

// ───────────────────────────────────────────────────────────────
// Fan output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the fan and LED.
pub trait FanOutputPort {
    /// Set the PWM duty (0–255).
    fn set_duty(&mut self, duty: DutyValue);

    /// Switch the fan supply on or off.
    fn set_power(&mut self, on: bool);

    /// Set the status LED level.
    fn set_status_led(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Must never go backwards.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Wake port (driven adapter: domain → power management)
// ───────────────────────────────────────────────────────────────

/// Why a [`WakePort::sleep`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The requested deadline passed.
    Timer,
    /// A switch edge arrived.
    Switch,
    /// Anything else (spurious wake, unknown cause).
    Other,
}

/// Sleep until `after_ms` elapses or a switch edge arrives.
///
/// `None` means no deadline: sleep until a switch edge.  `pwm_active` tells
/// the implementation that the PWM timer is generating a partial duty and
/// must keep its clock, which limits how deep the CPU may sleep.
pub trait WakePort {
    fn sleep(&mut self, after_ms: Option<u64>, pwm_active: bool) -> WakeReason;
}
