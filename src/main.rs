//! VentFan Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution and light sleep.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   MonotonicClock          │
//! │  (Switch+FanOutput)     (EventSink)    (ClockPort)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              FanService (pure logic)                   │    │
//! │  │  FSM · Ramp · Interval                                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Event queue (ISR → loop) · PowerManager (WakePort)            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the host the same loop runs against simulated pins:
//! `ventfan [off|continuous|interval] [low|medium|high] [config.json]`.
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{info, warn};

use ventfan::adapters::hardware::HardwareAdapter;
use ventfan::adapters::log_sink::LogEventSink;
use ventfan::adapters::time::MonotonicClock;
use ventfan::app::ports::{ClockPort, WakePort};
use ventfan::app::service::FanService;
use ventfan::config::FanConfig;
use ventfan::drivers::hw_init;
use ventfan::events::{self, SystemEvent};
use ventfan::power::PowerManager;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VentFan v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration + peripherals ────────────────────────
    let config = load_config()?;
    bring_up(&config).context("bring-up failed")?;
    info!(
        "Config: levels {:?}, cycle {} ms",
        config.levels(),
        config.control_cycle_ms
    );

    // ── 3. Switch interrupts ──────────────────────────────────
    if let Err(e) = hw_init::init_isr_service() {
        // Switches are still read on every timed wake; only latency suffers.
        warn!("ISR service init failed: {} — switch edges will be missed", e);
    }

    // ── 4. Adapters + service ─────────────────────────────────
    let clock = MonotonicClock::new();
    let mut hw = HardwareAdapter::board(config.switch_debounce_ms);
    let mut sink = LogEventSink::new();
    let mut power = PowerManager::new();
    let mut app = FanService::new(config);

    app.start(clock.now_ms(), &mut hw, &mut sink);
    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        let now = clock.now_ms();

        // Switch edges from ISRs or a GPIO wake: start (or restart) debounce.
        events::drain_events(|event| match event {
            SystemEvent::SwitchEdge(_) | SystemEvent::SwitchWake => hw.note_switch_edge(now),
        });
        let dropped = events::take_dropped();
        if dropped > 0 {
            warn!("event queue overflow: {} switch edges dropped", dropped);
            hw.note_switch_edge(now);
        }

        // Settled switch changes, mode first.
        for event in hw.poll_switches(now) {
            app.handle_event(event, now, &mut hw, &mut sink);
        }

        // Ramp steps, ON-phase end, pause end and blips.
        app.tick(now, &mut hw, &mut sink);

        let now = clock.now_ms();
        let deadline = earliest(app.next_wake_in(now), hw.next_switch_poll_in(now));

        #[cfg(not(target_os = "espidf"))]
        if deadline.is_none() {
            // Nothing on the host can move a switch once we are blocked.
            info!("sim: {} until a switch moves, exiting", app.state().name());
            return Ok(());
        }

        power.sleep(deadline, hw.is_pwm_active());
    }
}

/// Validate the configuration, then configure the peripherals.
fn bring_up(config: &FanConfig) -> ventfan::error::Result<()> {
    config.validate()?;
    hw_init::init_peripherals()?;
    Ok(())
}

/// The sooner of two optional deadlines.
fn earliest(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, y) => x.or(y),
    }
}

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

#[cfg(target_os = "espidf")]
fn load_config() -> Result<FanConfig> {
    Ok(FanConfig::default())
}

/// Host: set the simulated switch pins from the command line and load an
/// optional JSON override.
#[cfg(not(target_os = "espidf"))]
fn load_config() -> Result<FanConfig> {
    use hw_init::sim;
    use ventfan::pins;

    let args: Vec<String> = std::env::args().skip(1).collect();

    // Levels as (p1, p2); a selected throw reads LOW.
    let mode = match args.first().map_or("off", String::as_str) {
        "off" => (true, true),
        "continuous" => (true, false),
        "interval" => (false, true),
        other => anyhow::bail!("unknown mode '{other}' (off|continuous|interval)"),
    };
    let intensity = match args.get(1).map_or("medium", String::as_str) {
        "low" => (false, true),
        "medium" => (true, true),
        "high" => (true, false),
        other => anyhow::bail!("unknown intensity '{other}' (low|medium|high)"),
    };
    sim::set_input(pins::MODE_P1_GPIO, mode.0);
    sim::set_input(pins::MODE_P2_GPIO, mode.1);
    sim::set_input(pins::INTENSITY_P1_GPIO, intensity.0);
    sim::set_input(pins::INTENSITY_P2_GPIO, intensity.1);

    match args.get(2) {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            let config = FanConfig::from_json(&text)
                .with_context(|| format!("parsing config file {path}"))?;
            info!("Config loaded from {}", path);
            Ok(config)
        }
        None => Ok(FanConfig::default()),
    }
}
