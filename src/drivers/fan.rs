//! 12 V fan output stage: PWM duty plus a supply-enable switch.
//!
//! The PWM channel drives the fan MOSFET gate; a separate high-side switch
//! cuts the supply entirely so a stopped fan draws nothing.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` pins.  On ESP-IDF these are the LEDC channel
//! and GPIO from `hw_init`; on host/test any mock implementing the traits.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::control::{DUTY_MAX, DUTY_MIN, DutyValue};
use crate::error::OutputError;

pub struct FanDriver<P, E> {
    pwm: P,
    enable: E,
    duty: DutyValue,
    powered: bool,
}

impl<P: SetDutyCycle, E: OutputPin> FanDriver<P, E> {
    /// Take ownership of the pins.  Assumes both idle low, as left by
    /// `hw_init`.
    pub fn new(pwm: P, enable: E) -> Self {
        Self {
            pwm,
            enable,
            duty: DUTY_MIN,
            powered: false,
        }
    }

    /// Set the 8-bit duty, scaled to the channel's resolution.
    pub fn set_duty(&mut self, duty: DutyValue) -> Result<(), OutputError> {
        self.pwm
            .set_duty_cycle_fraction(u16::from(duty), u16::from(DUTY_MAX))
            .map_err(|_| OutputError::PwmWriteFailed)?;
        self.duty = duty;
        Ok(())
    }

    pub fn set_power(&mut self, on: bool) -> Result<(), OutputError> {
        let res = if on {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        };
        res.map_err(|_| OutputError::GpioWriteFailed)?;
        self.powered = on;
        Ok(())
    }

    /// Best-effort stop: zero duty and cut the supply, attempting both even
    /// if the first write fails.
    pub fn shutdown(&mut self) -> Result<(), OutputError> {
        let duty = self.set_duty(DUTY_MIN);
        let power = self.set_power(false);
        duty.and(power)
    }

    pub fn duty(&self) -> DutyValue {
        self.duty
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// The PWM output is toggling (duty strictly between MIN and MAX), so
    /// the LEDC clock must keep running.
    pub fn is_pwm_active(&self) -> bool {
        self.duty > DUTY_MIN && self.duty < DUTY_MAX
    }
}
