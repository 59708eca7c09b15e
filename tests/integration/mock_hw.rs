//! Mock hardware adapter for integration tests.
//!
//! Records every output call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.  Switch positions are
//! plain fields the test flips before dispatching the matching event.

use ventfan::app::events::AppEvent;
use ventfan::app::ports::{EventSink, FanOutputPort, SwitchPort};
use ventfan::app::service::FanService;
use ventfan::config::FanConfig;
use ventfan::control::DutyValue;
use ventfan::fsm::context::{Intensity, Mode};
use ventfan::fsm::{Event, FanState, Transition};

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    SetDuty(DutyValue),
    SetPower(bool),
    SetLed(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub mode: Mode,
    pub intensity: Intensity,
    pub calls: Vec<OutputCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(mode: Mode, intensity: Intensity) -> Self {
        Self {
            mode,
            intensity,
            calls: Vec::new(),
        }
    }

    /// Last duty written, 0 if none yet.
    pub fn duty(&self) -> DutyValue {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::SetDuty(d) => Some(*d),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn powered(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::SetPower(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn led(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::SetLed(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Every duty written, in order.
    pub fn duty_history(&self) -> Vec<DutyValue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                OutputCall::SetDuty(d) => Some(*d),
                _ => None,
            })
            .collect()
    }
}

impl SwitchPort for MockHardware {
    fn current_mode(&self) -> Mode {
        self.mode
    }

    fn current_intensity(&self) -> Intensity {
        self.intensity
    }
}

impl FanOutputPort for MockHardware {
    fn set_duty(&mut self, duty: DutyValue) {
        self.calls.push(OutputCall::SetDuty(duty));
    }

    fn set_power(&mut self, on: bool) {
        self.calls.push(OutputCall::SetPower(on));
    }

    fn set_status_led(&mut self, on: bool) {
        self.calls.push(OutputCall::SetLed(on));
    }
}

// ── EventLog ──────────────────────────────────────────────────

/// Collects emitted app events for assertion.
#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(from, to)` of every transition, in order.
    pub fn transitions(&self) -> Vec<(FanState, FanState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn count_entries(&self, state: FanState) -> usize {
        self.transitions().iter().filter(|(_, to)| *to == state).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Service plus mocks plus a simulated clock, driven the way the firmware
/// main loop drives it: sleep to the next deadline, then tick.
pub struct Rig {
    pub app: FanService,
    pub hw: MockHardware,
    pub log: EventLog,
    pub now: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn boot(mode: Mode, intensity: Intensity) -> Self {
        Self::boot_with(FanConfig::default(), mode, intensity)
    }

    pub fn boot_with(config: FanConfig, mode: Mode, intensity: Intensity) -> Self {
        let mut rig = Self {
            app: FanService::new(config),
            hw: MockHardware::new(mode, intensity),
            log: EventLog::new(),
            now: 0,
        };
        rig.app.start(rig.now, &mut rig.hw, &mut rig.log);
        rig
    }

    /// Move the mode switch and deliver the change.
    pub fn set_mode(&mut self, mode: Mode) -> Option<Transition> {
        self.hw.mode = mode;
        self.app
            .handle_event(Event::ModeChanged, self.now, &mut self.hw, &mut self.log)
    }

    /// Move the intensity switch and deliver the change.
    pub fn set_intensity(&mut self, intensity: Intensity) -> Option<Transition> {
        self.hw.intensity = intensity;
        self.app
            .handle_event(Event::IntensityChanged, self.now, &mut self.hw, &mut self.log)
    }

    /// Advance the clock by `ms`, waking at every deadline on the way.
    pub fn run_for(&mut self, ms: u64) {
        let end = self.now + ms;
        while self.now < end {
            let step = self.app.next_wake_in(self.now).map_or(end - self.now, |d| d.max(1));
            self.now = (self.now + step).min(end);
            self.app.tick(self.now, &mut self.hw, &mut self.log);
        }
    }

    /// Run until the machine enters `state`, giving up after `limit_ms`.
    /// Returns whether it got there.
    pub fn run_until(&mut self, state: FanState, limit_ms: u64) -> bool {
        let end = self.now + limit_ms;
        while self.app.state() != state && self.now < end {
            let step = self.app.next_wake_in(self.now).map_or(end - self.now, |d| d.max(1));
            self.now = (self.now + step).min(end);
            self.app.tick(self.now, &mut self.hw, &mut self.log);
        }
        self.app.state() == state
    }
}
