//! Interval-mode integration tests: ON phase, soft stop into the pause,
//! pause blips and pause-length changes.

use crate::mock_hw::Rig;

use ventfan::app::events::AppEvent;
use ventfan::config::FanConfig;
use ventfan::fsm::context::{Intensity, Mode};
use ventfan::fsm::{Event, FanState};

const ON_PHASE_MS: u64 = 300_000;

/// Boot in interval mode and run until the first pause begins.
fn rig_in_first_pause(intensity: Intensity) -> Rig {
    let mut rig = Rig::boot(Mode::Interval, intensity);
    assert!(rig.run_until(FanState::Pausing, ON_PHASE_MS + 30_000));
    rig
}

#[test]
fn on_phase_runs_at_interval_level_for_five_minutes() {
    let mut rig = Rig::boot(Mode::Interval, Intensity::Low);
    assert_eq!(rig.app.target_duty(), 255, "ON level ignores intensity");

    assert!(rig.run_until(FanState::Steady, 10_000));
    // (255 - 86) / 5 rounded up.
    let reached = rig.now;
    assert_eq!(reached, 34 * 200);

    assert!(rig.run_until(FanState::SlowingDown, ON_PHASE_MS + 1_000));
    assert_eq!(rig.now - reached, ON_PHASE_MS);
    assert!(matches!(
        rig.log.events.last(),
        Some(AppEvent::StateChanged {
            cause: Event::IntervalPhaseEnded,
            ..
        })
    ));
}

#[test]
fn on_phase_end_ramps_down_into_pause() {
    let mut rig = Rig::boot(Mode::Interval, Intensity::High);
    assert!(rig.run_until(FanState::SlowingDown, ON_PHASE_MS + 10_000));

    assert!(rig.run_until(FanState::Pausing, 20_000));
    assert!(!rig.hw.powered());
    assert_eq!(rig.hw.duty(), 0);
    assert!(!rig.hw.led());
    assert_eq!(rig.app.pause_duration_ms(), 60_000);
    assert_eq!(
        rig.log.events.last(),
        Some(&AppEvent::PauseBegun { duration_ms: 60_000 })
    );
}

#[test]
fn pause_length_follows_intensity() {
    let rig = rig_in_first_pause(Intensity::Medium);
    assert_eq!(rig.app.pause_duration_ms(), 600_000);

    let rig = rig_in_first_pause(Intensity::Low);
    assert_eq!(rig.app.pause_duration_ms(), 3_300_000);
}

#[test]
fn pause_blips_led_every_five_seconds() {
    let mut rig = rig_in_first_pause(Intensity::High);

    rig.run_for(4_999);
    assert!(!rig.hw.led(), "first blip comes one period in");
    rig.run_for(1);
    assert!(rig.hw.led());
    rig.run_for(200);
    assert!(!rig.hw.led());
    rig.run_for(4_800);
    assert!(rig.hw.led());
    assert!(!rig.hw.powered(), "blips never power the fan");
}

#[test]
fn pause_end_starts_next_on_phase() {
    let mut rig = rig_in_first_pause(Intensity::High);
    let paused_at = rig.now;

    assert!(rig.run_until(FanState::SpeedingUp, 70_000));
    assert_eq!(rig.now - paused_at, 60_000);
    assert!(rig.hw.powered());
    assert_eq!(rig.hw.duty(), 86);
    assert!(!rig.hw.led(), "a blip never survives the pause");

    // And the cycle repeats.
    assert!(rig.run_until(FanState::Pausing, ON_PHASE_MS + 30_000));
    assert_eq!(rig.log.count_entries(FanState::Pausing), 2);
}

#[test]
fn shortening_an_elapsed_pause_resumes_at_once() {
    let mut rig = rig_in_first_pause(Intensity::Medium);
    rig.run_for(100_000);
    assert_eq!(rig.app.state(), FanState::Pausing);

    let t = rig.set_intensity(Intensity::High).expect("pause already over");
    assert_eq!((t.from, t.to), (FanState::Pausing, FanState::SpeedingUp));
    assert!(rig.hw.powered());
}

#[test]
fn long_pause_cut_short_by_high_intensity() {
    let mut rig = rig_in_first_pause(Intensity::Low);
    rig.run_for(60_000);

    let t = rig.set_intensity(Intensity::High).expect("short pause elapsed");
    assert_eq!(t.to, FanState::SpeedingUp);
    assert_eq!(rig.app.target_duty(), 255);
}

#[test]
fn lengthening_a_pause_extends_it() {
    let mut rig = rig_in_first_pause(Intensity::High);
    rig.run_for(30_000);

    assert!(rig.set_intensity(Intensity::Low).is_none());
    assert_eq!(rig.app.pause_duration_ms(), 3_300_000);
    rig.run_for(60_000);
    assert_eq!(rig.app.state(), FanState::Pausing);
}

#[test]
fn mode_off_during_pause_goes_straight_off() {
    let mut rig = rig_in_first_pause(Intensity::High);
    rig.run_for(5_000);
    assert!(rig.hw.led());

    let t = rig.set_mode(Mode::Off).expect("should stop");
    assert_eq!(t.to, FanState::Off);
    assert!(!rig.hw.led());
    assert!(!rig.hw.powered());
    assert_eq!(rig.app.next_wake_in(rig.now), None);
}

#[test]
fn mode_continuous_during_pause_starts_continuous_ramp() {
    let mut rig = rig_in_first_pause(Intensity::Medium);

    let t = rig.set_mode(Mode::Continuous).expect("should start");
    assert_eq!(t.to, FanState::SpeedingUp);
    assert_eq!(rig.app.target_duty(), 176);
    assert!(rig.run_until(FanState::Steady, 10_000));

    // Continuous Steady has no phase timer.
    assert_eq!(rig.app.next_wake_in(rig.now), None);
}

#[test]
fn intensity_change_during_interval_on_phase_is_ignored() {
    let mut rig = Rig::boot(Mode::Interval, Intensity::High);
    assert!(rig.run_until(FanState::Steady, 10_000));
    let calls = rig.hw.calls.len();

    assert!(rig.set_intensity(Intensity::Low).is_none());
    assert_eq!(rig.hw.calls.len(), calls);
    assert_eq!(rig.hw.duty(), 255);
}

#[test]
fn interval_cycle_honours_configured_timing() {
    let config = FanConfig {
        interval_on_secs: 10,
        pause_short_secs: 5,
        ..FanConfig::default()
    };
    let mut rig = Rig::boot_with(config, Mode::Interval, Intensity::High);

    assert!(rig.run_until(FanState::Steady, 10_000));
    let reached = rig.now;
    assert!(rig.run_until(FanState::SlowingDown, 20_000));
    assert_eq!(rig.now - reached, 10_000);

    assert!(rig.run_until(FanState::Pausing, 20_000));
    let paused = rig.now;
    assert!(rig.run_until(FanState::SpeedingUp, 10_000));
    assert_eq!(rig.now - paused, 5_000);
}
