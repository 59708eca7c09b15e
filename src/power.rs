//! Power management: how deep to sleep between pieces of work.
//!
//! ```text
//!   duty 0 or 255 ──▶ Light sleep  (timer + switch GPIO wakeup)
//!   0 < duty < 255 ──▶ Idle wait   (LEDC keeps clocking the PWM)
//! ```
//!
//! The service says *when* it next needs to run; this module decides *how*
//! to wait for it.  Light sleep stops the LEDC clock, so it is only taken
//! while the fan output is a constant level.  With no deadline the chip
//! waits for a switch edge alone.

use log::debug;

use crate::app::ports::{WakePort, WakeReason};
use crate::events;

/// How the CPU waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepDepth {
    /// Stay awake in the RTOS idle task; peripherals keep their clocks.
    Idle,
    /// Light sleep: CPU and most clocks stop, RAM and GPIO state retained.
    Light,
}

/// Deepest sleep compatible with the fan output.
pub fn choose_depth(pwm_active: bool) -> SleepDepth {
    if pwm_active {
        SleepDepth::Idle
    } else {
        SleepDepth::Light
    }
}

/// Longest single idle slice; switch events are checked between slices.
const IDLE_SLICE_MS: u64 = 10;

pub struct PowerManager {
    light_sleep_enabled: bool,
}

impl Default for PowerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerManager {
    pub fn new() -> Self {
        Self {
            light_sleep_enabled: cfg!(target_os = "espidf"),
        }
    }

    /// Wait in short RTOS delays until the deadline passes or an event is
    /// queued.
    fn idle_wait(&mut self, after_ms: Option<u64>) -> WakeReason {
        let start = std::time::Instant::now();
        loop {
            if events::has_pending() {
                return WakeReason::Switch;
            }
            let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            let slice = match after_ms {
                Some(total) if elapsed >= total => return WakeReason::Timer,
                Some(total) => (total - elapsed).min(IDLE_SLICE_MS),
                None => IDLE_SLICE_MS,
            };
            std::thread::sleep(std::time::Duration::from_millis(slice));
        }
    }

    #[cfg(target_os = "espidf")]
    #[allow(non_upper_case_globals)]
    fn light_sleep(&mut self, after_ms: Option<u64>) -> WakeReason {
        use esp_idf_svc::sys::*;

        use crate::events::{SystemEvent, push_event};
        use crate::pins;

        // SAFETY: main-task only.  Switch interrupts are masked while their
        // pins are reconfigured for level wakeup, and restored to any-edge
        // before they are unmasked.
        let cause = unsafe {
            for &pin in &pins::SWITCH_GPIOS {
                gpio_intr_disable(pin);
                // Wake on the level opposite to the one the pin sits at now.
                let wake_level = if gpio_get_level(pin) == 0 {
                    gpio_int_type_t_GPIO_INTR_HIGH_LEVEL
                } else {
                    gpio_int_type_t_GPIO_INTR_LOW_LEVEL
                };
                gpio_wakeup_enable(pin, wake_level);
            }
            esp_sleep_enable_gpio_wakeup();
            if let Some(ms) = after_ms {
                esp_sleep_enable_timer_wakeup(ms.saturating_mul(1_000));
            }

            esp_light_sleep_start();

            let cause = esp_sleep_get_wakeup_cause();
            esp_sleep_disable_wakeup_source(esp_sleep_source_t_ESP_SLEEP_WAKEUP_ALL);
            for &pin in &pins::SWITCH_GPIOS {
                gpio_wakeup_disable(pin);
                gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_ANYEDGE);
                gpio_intr_enable(pin);
            }
            cause
        };

        match cause {
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => WakeReason::Timer,
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO => {
                push_event(SystemEvent::SwitchWake);
                WakeReason::Switch
            }
            _ => WakeReason::Other,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn light_sleep(&mut self, after_ms: Option<u64>) -> WakeReason {
        self.idle_wait(after_ms)
    }
}

impl WakePort for PowerManager {
    fn sleep(&mut self, after_ms: Option<u64>, pwm_active: bool) -> WakeReason {
        if events::has_pending() {
            return WakeReason::Switch;
        }
        if after_ms == Some(0) {
            return WakeReason::Timer;
        }
        let depth = if self.light_sleep_enabled {
            choose_depth(pwm_active)
        } else {
            SleepDepth::Idle
        };
        debug!("power: {:?} for {:?} ms", depth, after_ms);
        match depth {
            SleepDepth::Idle => self.idle_wait(after_ms),
            SleepDepth::Light => self.light_sleep(after_ms),
        }
    }
}
