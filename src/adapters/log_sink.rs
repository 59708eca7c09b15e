//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production, stderr in the simulator).
//! One line per event, `TAG | key=value` style.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                state,
                mode,
                intensity,
            } => {
                info!(
                    "START | state={} mode={} intensity={}",
                    state.name(),
                    mode.name(),
                    intensity.name()
                );
            }
            AppEvent::StateChanged { from, to, cause } => {
                info!(
                    "STATE | {} --[{}]--> {}",
                    from.name(),
                    cause.name(),
                    to.name()
                );
            }
            // One per control cycle while ramping; keep it out of info.
            AppEvent::RampStep {
                state,
                duty,
                target,
            } => {
                debug!("RAMP | state={} duty={} target={}", state.name(), duty, target);
            }
            AppEvent::PauseBegun { duration_ms } => {
                info!("PAUSE | duration={}s", duration_ms / 1000);
            }
        }
    }
}
