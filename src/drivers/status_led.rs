//! Single-colour status LED driver.
//!
//! ## Dual-target design
//!
//! Generic over an `embedded-hal` output pin.  On ESP-IDF this is the
//! `hw_init` GPIO; on host/test any mock pin.

use embedded_hal::digital::OutputPin;

use crate::error::OutputError;

pub struct StatusLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) -> Result<(), OutputError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| OutputError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn invert(&mut self) -> Result<(), OutputError> {
        self.set(!self.on)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital;

    #[derive(Default)]
    struct Pin {
        level: bool,
        writes: u32,
    }

    impl digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.level = false;
            self.writes += 1;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.level = true;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn invert_toggles_tracked_level() {
        let mut led = StatusLed::new(Pin::default());
        led.invert().unwrap();
        assert!(led.is_on() && led.pin.level);
        led.invert().unwrap();
        assert!(!led.is_on() && !led.pin.level);
        assert_eq!(led.pin.writes, 2);
    }
}
