//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the fan output stage, the status LED and the switch bank, exposing
//! them through [`SwitchPort`] and [`FanOutputPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying pins use the `hw_init` simulation state.
//!
//! Driver failures stop here: they are logged and the fan is shut down,
//! the domain never sees them.  Power comes back on the next non-zero
//! duty write while the service still wants the fan running.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::{FanOutputPort, SwitchPort};
use crate::control::DutyValue;
use crate::drivers::fan::FanDriver;
use crate::drivers::hw_init::{GpioInput, GpioOutput, LedcChannel};
use crate::drivers::status_led::StatusLed;
use crate::drivers::switches::SwitchBank;
use crate::error::Error;
use crate::fsm::Event;
use crate::fsm::context::{Intensity, Mode};
use crate::pins;

pub type BoardFan = FanDriver<LedcChannel, GpioOutput>;
pub type BoardLed = StatusLed<GpioOutput>;
pub type BoardSwitches = SwitchBank<GpioInput>;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    fan: BoardFan,
    led: BoardLed,
    switches: BoardSwitches,
    /// Last power state the service asked for.
    power_wanted: bool,
}

impl HardwareAdapter {
    pub fn new(fan: BoardFan, led: BoardLed, switches: BoardSwitches) -> Self {
        Self {
            fan,
            led,
            switches,
            power_wanted: false,
        }
    }

    /// Wire up the board pins from [`pins`].  Peripherals must already be
    /// configured by `hw_init::init_peripherals`.
    pub fn board(switch_debounce_ms: u32) -> Self {
        Self::new(
            FanDriver::new(
                LedcChannel::new(pins::LEDC_CH_FAN),
                GpioOutput::new(pins::FAN_POWER_GPIO),
            ),
            StatusLed::new(GpioOutput::new(pins::STATUS_LED_GPIO)),
            SwitchBank::new(
                GpioInput::new(pins::MODE_P1_GPIO),
                GpioInput::new(pins::MODE_P2_GPIO),
                GpioInput::new(pins::INTENSITY_P1_GPIO),
                GpioInput::new(pins::INTENSITY_P2_GPIO),
                switch_debounce_ms,
            ),
        )
    }

    // ── Switch plumbing for the main loop ─────────────────────

    pub fn note_switch_edge(&mut self, now_ms: u64) {
        self.switches.note_edge(now_ms);
    }

    pub fn poll_switches(&mut self, now_ms: u64) -> Vec<Event, 2> {
        self.switches.poll(now_ms)
    }

    pub fn next_switch_poll_in(&self, now_ms: u64) -> Option<u64> {
        self.switches.next_poll_in(now_ms)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_pwm_active(&self) -> bool {
        self.fan.is_pwm_active()
    }

    pub fn fan_duty(&self) -> DutyValue {
        self.fan.duty()
    }

    pub fn is_fan_powered(&self) -> bool {
        self.fan.is_powered()
    }

    pub fn is_led_on(&self) -> bool {
        self.led.is_on()
    }

    fn fail_safe(&mut self, what: &str, err: Error) {
        warn!("{what} failed: {err}; shutting fan down");
        if let Err(e) = self.fan.shutdown() {
            warn!("fan shutdown failed: {e}");
        }
    }
}

// ── SwitchPort implementation ─────────────────────────────────

impl SwitchPort for HardwareAdapter {
    fn current_mode(&self) -> Mode {
        self.switches.current_mode()
    }

    fn current_intensity(&self) -> Intensity {
        self.switches.current_intensity()
    }
}

// ── FanOutputPort implementation ──────────────────────────────

impl FanOutputPort for HardwareAdapter {
    fn set_duty(&mut self, duty: DutyValue) {
        if duty > 0 && self.power_wanted && !self.fan.is_powered() {
            if let Err(e) = self.fan.set_power(true) {
                self.fail_safe("fan power restore", e.into());
                return;
            }
            info!("fan power restored after fail-safe");
        }
        if let Err(e) = self.fan.set_duty(duty) {
            self.fail_safe("fan duty write", e.into());
        }
    }

    fn set_power(&mut self, on: bool) {
        self.power_wanted = on;
        if let Err(e) = self.fan.set_power(on) {
            self.fail_safe("fan power write", e.into());
        }
    }

    fn set_status_led(&mut self, on: bool) {
        // Cosmetic: no need to stop the fan over a stuck LED.
        if let Err(e) = self.led.set(on) {
            warn!("status LED write failed: {e}");
        }
    }
}
