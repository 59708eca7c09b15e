//! Continuous-mode integration tests: boot, soft start, speed changes and
//! soft stop through `FanService` against the recording mock.

use crate::mock_hw::{OutputCall, Rig};

use ventfan::app::events::AppEvent;
use ventfan::fsm::context::{Intensity, Mode};
use ventfan::fsm::{Event, FanState};

// ── Boot ─────────────────────────────────────────────────────

#[test]
fn boot_with_mode_off_writes_safe_outputs_once() {
    let rig = Rig::boot(Mode::Off, Intensity::Medium);

    assert_eq!(rig.app.state(), FanState::Off);
    assert_eq!(
        rig.hw.calls,
        vec![
            OutputCall::SetPower(false),
            OutputCall::SetDuty(0),
            OutputCall::SetLed(false),
        ]
    );
    assert_eq!(
        rig.log.events,
        vec![AppEvent::Started {
            state: FanState::Off,
            mode: Mode::Off,
            intensity: Intensity::Medium,
        }]
    );
    assert_eq!(rig.app.next_wake_in(rig.now), None);
}

#[test]
fn boot_in_running_mode_starts_fan_immediately() {
    let rig = Rig::boot(Mode::Continuous, Intensity::High);

    assert_eq!(rig.app.state(), FanState::SpeedingUp);
    assert!(rig.hw.powered());
    assert_eq!(rig.hw.duty(), 86, "soft start begins at the stall threshold");
    assert_eq!(rig.app.target_duty(), 255);
    assert_eq!(rig.log.transitions(), vec![(FanState::Off, FanState::SpeedingUp)]);
    assert!(matches!(
        rig.log.events.last(),
        Some(AppEvent::StateChanged {
            cause: Event::ModeChanged,
            ..
        })
    ));
}

#[test]
fn boot_at_low_intensity_settles_without_ramping() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Low);
    assert!(rig.run_until(FanState::Steady, 1_000));
    assert_eq!(rig.hw.duty(), 86);
    assert_eq!(rig.hw.duty_history(), vec![0, 86]);
}

// ── Soft start ───────────────────────────────────────────────

#[test]
fn switching_on_ramps_to_medium_then_holds() {
    let mut rig = Rig::boot(Mode::Off, Intensity::Medium);

    let t = rig.set_mode(Mode::Continuous).expect("fan should start");
    assert_eq!((t.from, t.to), (FanState::Off, FanState::SpeedingUp));

    assert!(rig.run_until(FanState::Steady, 10_000));
    // (176 - 86) / 5 steps of one 200 ms cycle each.
    assert_eq!(rig.now, 18 * 200);
    assert_eq!(rig.hw.duty(), 176);
    assert!(!rig.hw.led(), "LED is dark while holding speed");
    assert_eq!(rig.app.ramp(), None);
    assert!(rig.app.commands().power);

    let history = rig.hw.duty_history();
    assert!(history.windows(2).all(|w| w[0] <= w[1]), "{history:?}");

    // Nothing more to do until a switch moves.
    let calls = rig.hw.calls.len();
    rig.run_for(60_000);
    assert_eq!(rig.hw.calls.len(), calls);
    assert_eq!(rig.app.next_wake_in(rig.now), None);
}

#[test]
fn status_led_blinks_while_ramping() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    rig.run_for(200);
    assert!(rig.hw.led());
    rig.run_for(200);
    assert!(!rig.hw.led());
}

#[test]
fn ramp_steps_are_reported() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    rig.run_for(200);
    assert_eq!(
        rig.log.events.last(),
        Some(&AppEvent::RampStep {
            state: FanState::SpeedingUp,
            duty: 91,
            target: 176,
        })
    );
}

// ── Speed changes ────────────────────────────────────────────

#[test]
fn raising_intensity_in_steady_speeds_up() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    assert!(rig.run_until(FanState::Steady, 10_000));

    let t = rig.set_intensity(Intensity::High).expect("should ramp up");
    assert_eq!(t.to, FanState::SpeedingUp);
    let started = rig.now;
    assert!(rig.run_until(FanState::Steady, 10_000));
    assert_eq!(rig.hw.duty(), 255);
    // 79 duty over steps of 5, the last one capped.
    assert_eq!(rig.now - started, 16 * 200);
}

#[test]
fn lowering_intensity_in_steady_slows_down() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::High);
    assert!(rig.run_until(FanState::Steady, 10_000));

    let t = rig.set_intensity(Intensity::Medium).expect("should ramp down");
    assert_eq!(t.to, FanState::SlowingDown);
    assert!(rig.run_until(FanState::Steady, 10_000));
    assert_eq!(rig.hw.duty(), 176);
    assert!(rig.hw.powered());
}

#[test]
fn medium_to_low_targets_low_duty() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    assert!(rig.run_until(FanState::Steady, 10_000));

    let t = rig.set_intensity(Intensity::Low).expect("should ramp down");
    assert_eq!(t.to, FanState::SlowingDown);
    assert_eq!(rig.app.target_duty(), 86);
    assert!(rig.run_until(FanState::Steady, 10_000));
    assert_eq!(rig.hw.duty(), 86);
}

#[test]
fn lowering_intensity_mid_start_reverses_ramp() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::High);
    rig.run_for(1_000);
    assert_eq!(rig.hw.duty(), 111);

    let t = rig.set_intensity(Intensity::Low).expect("should reverse");
    assert_eq!(t.to, FanState::SlowingDown);
    assert!(rig.run_until(FanState::Steady, 10_000));
    assert_eq!(rig.hw.duty(), 86);
    assert!(rig.hw.powered(), "low intensity keeps the fan spinning");
}

#[test]
fn raising_target_mid_start_keeps_ramping() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    rig.run_for(1_000);

    assert!(rig.set_intensity(Intensity::High).is_none());
    assert_eq!(rig.app.state(), FanState::SpeedingUp);
    assert_eq!(rig.app.target_duty(), 255);
    assert!(rig.run_until(FanState::Steady, 10_000));
    assert_eq!(rig.hw.duty(), 255);
}

// ── Soft stop ────────────────────────────────────────────────

#[test]
fn switching_off_ramps_down_then_cuts_power() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::High);
    assert!(rig.run_until(FanState::Steady, 10_000));
    let written = rig.hw.duty_history().len();

    let t = rig.set_mode(Mode::Off).expect("should slow down");
    assert_eq!(t.to, FanState::SlowingDown);
    let started = rig.now;
    assert!(rig.run_until(FanState::Off, 20_000));

    // 43 steps of 4 to reach the threshold, one more to cut to zero.
    assert_eq!(rig.now - started, 44 * 200);
    assert_eq!(rig.hw.duty(), 0);
    assert!(!rig.hw.powered());
    assert!(!rig.hw.led());

    let stop = &rig.hw.duty_history()[written..];
    assert!(stop.windows(2).all(|w| w[0] >= w[1]), "{stop:?}");
    assert!(
        stop.iter().all(|&d| d == 0 || d >= 86),
        "duty never lingers below the stall threshold: {stop:?}"
    );
    assert_eq!(rig.log.count_entries(FanState::Off), 1);
}

#[test]
fn switching_off_mid_start_stops_from_current_duty() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::High);
    rig.run_for(600);
    assert_eq!(rig.hw.duty(), 101);

    rig.set_mode(Mode::Off);
    assert_eq!(rig.app.state(), FanState::SlowingDown);
    assert_eq!(rig.hw.duty(), 101, "no jump when the stop begins");
    assert!(rig.run_until(FanState::Off, 5_000));
    assert!(!rig.hw.powered());
}

#[test]
fn switching_back_on_while_stopping_finishes_the_stop() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    assert!(rig.run_until(FanState::Steady, 10_000));
    rig.set_mode(Mode::Off);
    rig.run_for(400);

    assert!(rig.set_mode(Mode::Continuous).is_none());
    assert_eq!(rig.app.state(), FanState::SlowingDown);
    assert!(rig.run_until(FanState::Steady, 20_000));
    assert_eq!(rig.hw.duty(), 0);

    // An intensity change then starts it again.
    let t = rig.set_intensity(Intensity::High).expect("should restart");
    assert_eq!(t.to, FanState::SpeedingUp);
    assert!(rig.run_until(FanState::Steady, 10_000));
    assert_eq!(rig.hw.duty(), 255);
}

// ── Idempotence and robustness ───────────────────────────────

#[test]
fn unchanged_switches_produce_no_output_writes() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    assert!(rig.run_until(FanState::Steady, 10_000));
    let calls = rig.hw.calls.len();

    assert!(rig.set_intensity(Intensity::Medium).is_none());
    assert!(rig.set_mode(Mode::Continuous).is_none());
    assert_eq!(rig.hw.calls.len(), calls);
}

#[test]
fn intensity_change_while_off_is_only_latched() {
    let mut rig = Rig::boot(Mode::Off, Intensity::Medium);
    let calls = rig.hw.calls.len();

    assert!(rig.set_intensity(Intensity::High).is_none());
    assert_eq!(rig.hw.calls.len(), calls);
    assert_eq!(rig.app.intensity(), Intensity::High);

    rig.set_mode(Mode::Continuous);
    assert_eq!(rig.app.target_duty(), 255);
}

#[test]
fn regressing_clock_does_not_rewind_ramp() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::High);
    rig.run_for(1_000);
    let duty = rig.hw.duty();

    rig.app.tick(500, &mut rig.hw, &mut rig.log);
    assert_eq!(rig.hw.duty(), duty);
    rig.app.tick(1_200, &mut rig.hw, &mut rig.log);
    assert_eq!(rig.hw.duty(), duty + 5);
}

#[test]
fn late_tick_catches_up_on_every_missed_step() {
    let mut rig = Rig::boot(Mode::Continuous, Intensity::Medium);
    rig.app.tick(1_000, &mut rig.hw, &mut rig.log);
    assert_eq!(rig.hw.duty(), 86 + 5 * 5);
    assert_eq!(rig.app.state(), FanState::SpeedingUp);
}
