//! Fuzz target: `FanService` event and tick sequences
//!
//! Interprets the input as a stream of switch moves and clock advances and
//! drives the service through them.  Asserts that the fan is never left
//! powered in `Off` or `Pausing`, that duty never parks between zero and
//! the stall threshold, and that a final switch-off always stops the fan.
//!
//! cargo fuzz run fuzz_event_sequence

#![no_main]

use libfuzzer_sys::fuzz_target;
use ventfan::app::events::AppEvent;
use ventfan::app::ports::{EventSink, FanOutputPort, SwitchPort};
use ventfan::app::service::FanService;
use ventfan::config::FanConfig;
use ventfan::fsm::context::{Intensity, Mode};
use ventfan::fsm::{Event, FanState};

struct Board {
    mode: Mode,
    intensity: Intensity,
    duty: u8,
    power: bool,
}

impl SwitchPort for Board {
    fn current_mode(&self) -> Mode {
        self.mode
    }
    fn current_intensity(&self) -> Intensity {
        self.intensity
    }
}

impl FanOutputPort for Board {
    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }
    fn set_power(&mut self, on: bool) {
        self.power = on;
    }
    fn set_status_led(&mut self, _on: bool) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fn mode_from(b: u8) -> Mode {
    match b % 4 {
        0 => Mode::Off,
        1 => Mode::Continuous,
        2 => Mode::Interval,
        _ => Mode::Undefined,
    }
}

fn intensity_from(b: u8) -> Intensity {
    match b % 4 {
        0 => Intensity::Low,
        1 => Intensity::Medium,
        2 => Intensity::High,
        _ => Intensity::Undefined,
    }
}

fuzz_target!(|data: &[u8]| {
    let config = FanConfig::default();
    let threshold = config.levels().low_threshold;
    let mut app = FanService::new(config);
    let mut hw = Board {
        mode: mode_from(data.first().copied().unwrap_or(0)),
        intensity: intensity_from(data.get(1).copied().unwrap_or(0)),
        duty: 0,
        power: false,
    };
    let mut sink = Discard;
    let mut now = 0u64;
    app.start(now, &mut hw, &mut sink);

    for pair in data.get(2..).unwrap_or_default().chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        match op % 3 {
            0 => {
                hw.mode = mode_from(arg);
                app.handle_event(Event::ModeChanged, now, &mut hw, &mut sink);
            }
            1 => {
                hw.intensity = intensity_from(arg);
                app.handle_event(Event::IntensityChanged, now, &mut hw, &mut sink);
            }
            _ => {
                // Up to ~25 s per step, scaled so long phases are reachable.
                now += u64::from(arg) * 100;
                app.tick(now, &mut hw, &mut sink);
            }
        }

        assert!(hw.duty == 0 || hw.duty >= threshold);
        assert!(hw.power || hw.duty == 0);
        if matches!(app.state(), FanState::Off | FanState::Pausing) {
            assert!(!hw.power);
        }
    }

    hw.mode = Mode::Off;
    app.handle_event(Event::ModeChanged, now, &mut hw, &mut sink);
    for _ in 0..100 {
        now += 200;
        app.tick(now, &mut hw, &mut sink);
    }
    assert_eq!(app.state(), FanState::Off);
    assert!(!hw.power);
});
