//! Outbound application events.
//!
//! The [`FanService`](super::service::FanService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them — log to serial, or record them in tests.

use crate::control::DutyValue;
use crate::fsm::context::{Intensity, Mode};
use crate::fsm::{Event, FanState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the switch positions read at boot).
    Started {
        state: FanState,
        mode: Mode,
        intensity: Intensity,
    },

    /// The FSM transitioned between states.
    StateChanged {
        from: FanState,
        to: FanState,
        cause: Event,
    },

    /// A ramp moved the applied duty without reaching its target.
    RampStep {
        state: FanState,
        duty: DutyValue,
        target: DutyValue,
    },

    /// An interval pause began.
    PauseBegun { duration_ms: u64 },
}
