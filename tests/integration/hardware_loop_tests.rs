//! End-to-end test of the board adapter on simulated pins: switch edges go
//! through the event queue and debounce, outputs land on the simulated
//! GPIO/LEDC state.
//!
//! The simulated pins are process-wide, so this file holds a single test.

use ventfan::adapters::hardware::HardwareAdapter;
use ventfan::adapters::log_sink::LogEventSink;
use ventfan::app::service::FanService;
use ventfan::config::FanConfig;
use ventfan::drivers::hw_init::sim;
use ventfan::events::{self, SwitchGroup, SystemEvent};
use ventfan::fsm::FanState;
use ventfan::fsm::context::Mode;
use ventfan::pins;

/// One main-loop pass: queued edges, settled switches, periodic work.
fn pass(app: &mut FanService, hw: &mut HardwareAdapter, sink: &mut LogEventSink, now: u64) {
    events::drain_events(|_| hw.note_switch_edge(now));
    for event in hw.poll_switches(now) {
        app.handle_event(event, now, hw, sink);
    }
    app.tick(now, hw, sink);
}

#[test]
fn switch_edges_drive_simulated_fan() {
    // Continuous / High: mode p2 and intensity p2 pulled LOW.
    sim::set_input(pins::MODE_P1_GPIO, true);
    sim::set_input(pins::MODE_P2_GPIO, false);
    sim::set_input(pins::INTENSITY_P1_GPIO, true);
    sim::set_input(pins::INTENSITY_P2_GPIO, false);

    let config = FanConfig::default();
    let mut hw = HardwareAdapter::board(config.switch_debounce_ms);
    let mut sink = LogEventSink::new();
    let mut app = FanService::new(config);

    app.start(0, &mut hw, &mut sink);
    assert_eq!(app.state(), FanState::SpeedingUp);
    assert!(sim::output(pins::FAN_POWER_GPIO));
    assert_eq!(sim::duty(pins::LEDC_CH_FAN), 86);
    assert!(hw.is_pwm_active());

    let mut now = 0;
    while app.state() != FanState::Steady && now < 20_000 {
        now += 200;
        pass(&mut app, &mut hw, &mut sink, now);
    }
    assert_eq!(app.state(), FanState::Steady);
    assert_eq!(sim::duty(pins::LEDC_CH_FAN), 255);
    assert_eq!(hw.fan_duty(), 255);
    assert!(!hw.is_pwm_active(), "full duty allows light sleep");

    // Flip the mode switch to centre; the ISR would queue an edge.
    sim::set_input(pins::MODE_P2_GPIO, true);
    events::push_event(SystemEvent::SwitchEdge(SwitchGroup::Mode));
    pass(&mut app, &mut hw, &mut sink, now);
    assert_eq!(app.state(), FanState::Steady, "edge is still bouncing");
    assert_eq!(hw.next_switch_poll_in(now), Some(50));

    now += 50;
    pass(&mut app, &mut hw, &mut sink, now);
    assert_eq!(app.state(), FanState::SlowingDown);
    assert_eq!(app.mode(), Mode::Off);

    while app.state() != FanState::Off && now < 40_000 {
        now += 200;
        pass(&mut app, &mut hw, &mut sink, now);
    }
    assert_eq!(app.state(), FanState::Off);
    assert!(!sim::output(pins::FAN_POWER_GPIO));
    assert_eq!(sim::duty(pins::LEDC_CH_FAN), 0);
    assert!(!sim::output(pins::STATUS_LED_GPIO));
    assert!(!hw.is_led_on());
    assert!(!hw.is_fan_powered());
}
