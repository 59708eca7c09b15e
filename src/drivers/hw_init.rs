//! One-shot hardware peripheral initialization and board pin types.
//!
//! Configures the switch inputs, the fan power and LED outputs, and the
//! LEDC timer/channel for the fan PWM using raw ESP-IDF sys calls.  Called
//! once from `main()` before the event loop starts.
//!
//! The pin types at the bottom ([`GpioInput`], [`GpioOutput`],
//! [`LedcChannel`]) wrap the configured peripherals behind the
//! `embedded-hal` 1.0 traits so the drivers stay target-agnostic.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: register access through `esp_idf_svc::sys`.
//! On host/test: input levels, output levels and PWM duties live in
//! atomics that tests and the simulator can read and drive.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

pub use crate::error::HwInitError;
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_switch_inputs()?;
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_switch_inputs() -> Result<(), HwInitError> {
    // Switch throws short to GND; idle level is HIGH through the pull-up.
    for &pin in &pins::SWITCH_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: switch inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::input(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::FAN_POWER_GPIO, pins::STATUS_LED_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
        // Keep the fan supply off through light sleep.
        unsafe { gpio_hold_en(pin) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), PinError> {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // the hold latch is released around the write.  Main-loop only.
    let ret = unsafe {
        gpio_hold_dis(pin);
        let ret = gpio_set_level(pin, u32::from(high));
        gpio_hold_en(pin);
        ret
    };
    if ret != ESP_OK as i32 {
        return Err(PinError(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), PinError> {
    sim::set_output(pin, high);
    Ok(())
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: fan (25 kHz, 8-bit)
    let timer0 = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::FAN_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    // Channel 0: fan PWM, starts at 0 duty
    let ret = unsafe {
        ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: pins::LEDC_CH_FAN,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: pins::FAN_PWM_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        })
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::LedcInitFailed(ret));
    }

    info!(
        "hw_init: LEDC configured (fan=CH{} @ {} Hz, {}-bit)",
        pins::LEDC_CH_FAN,
        pins::FAN_PWM_FREQ_HZ,
        pins::PWM_RESOLUTION_BITS
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) -> Result<(), PinError> {
    // SAFETY: LEDC channels were configured in init_ledc(); duty register
    // writes are race-free since only main loop calls this function.
    let ret = unsafe { ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty) };
    if ret != ESP_OK as i32 {
        return Err(PinError(ret));
    }
    let ret = unsafe { ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel) };
    if ret != ESP_OK as i32 {
        return Err(PinError(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(channel: u32, duty: u32) -> Result<(), PinError> {
    sim::set_duty(channel, duty);
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::events::{SwitchGroup, SystemEvent, push_event};

#[cfg(target_os = "espidf")]
unsafe extern "C" fn mode_switch_isr(_arg: *mut core::ffi::c_void) {
    push_event(SystemEvent::SwitchEdge(SwitchGroup::Mode));
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn intensity_switch_isr(_arg: *mut core::ffi::c_void) {
    push_event(SystemEvent::SwitchEdge(SwitchGroup::Intensity));
}

/// Install per-pin GPIO ISR service and register the switch handlers.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable). ISR handlers registered
    // below are static functions that only push to the lock-free event queue.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let handlers: [(i32, unsafe extern "C" fn(*mut core::ffi::c_void)); 4] = [
            (pins::MODE_P1_GPIO, mode_switch_isr),
            (pins::MODE_P2_GPIO, mode_switch_isr),
            (pins::INTENSITY_P1_GPIO, intensity_switch_isr),
            (pins::INTENSITY_P2_GPIO, intensity_switch_isr),
        ];
        for (pin, handler) in handlers {
            gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_ANYEDGE);
            let ret = gpio_isr_handler_add(pin, Some(handler), core::ptr::null_mut());
            if ret != ESP_OK as i32 {
                return Err(HwInitError::IsrInstallFailed(ret));
            }
            gpio_intr_enable(pin);
        }

        info!("hw_init: ISR service installed (mode×2, intensity×2)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

// ── Board pin types ───────────────────────────────────────────

/// Raw `esp_err_t` from a failed pin operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinError(pub i32);

impl digital::Error for PinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl pwm::Error for PinError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// A GPIO configured as input by [`init_peripherals`].
#[derive(Debug)]
pub struct GpioInput {
    pin: i32,
}

impl GpioInput {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl digital::ErrorType for GpioInput {
    type Error = PinError;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!gpio_read(self.pin))
    }
}

/// A GPIO configured as output by [`init_peripherals`].
#[derive(Debug)]
pub struct GpioOutput {
    pin: i32,
}

impl GpioOutput {
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl digital::ErrorType for GpioOutput {
    type Error = PinError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, true)
    }
}

/// An LEDC channel configured by [`init_peripherals`].
#[derive(Debug)]
pub struct LedcChannel {
    channel: u32,
}

impl LedcChannel {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl pwm::ErrorType for LedcChannel {
    type Error = PinError;
}

impl SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        (1u16 << pins::PWM_RESOLUTION_BITS) - 1
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        ledc_set(self.channel, u32::from(duty))
    }
}

// ── Host simulation state ─────────────────────────────────────

/// Pin levels seen and driven on the host.  Inputs idle HIGH like the
/// pulled-up switch pins on the board.
#[cfg(not(target_os = "espidf"))]
pub mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    const GPIO_COUNT: usize = 49;
    const LEDC_CHANNELS: usize = 8;

    static INPUTS: [AtomicBool; GPIO_COUNT] = [const { AtomicBool::new(true) }; GPIO_COUNT];
    static OUTPUTS: [AtomicBool; GPIO_COUNT] = [const { AtomicBool::new(false) }; GPIO_COUNT];
    static DUTIES: [AtomicU32; LEDC_CHANNELS] = [const { AtomicU32::new(0) }; LEDC_CHANNELS];

    fn slot(pin: i32) -> Option<usize> {
        usize::try_from(pin).ok().filter(|&p| p < GPIO_COUNT)
    }

    /// Drive a simulated input pin.
    pub fn set_input(pin: i32, high: bool) {
        if let Some(p) = slot(pin) {
            INPUTS[p].store(high, Ordering::Relaxed);
        }
    }

    pub fn input(pin: i32) -> bool {
        slot(pin).is_none_or(|p| INPUTS[p].load(Ordering::Relaxed))
    }

    pub(crate) fn set_output(pin: i32, high: bool) {
        if let Some(p) = slot(pin) {
            OUTPUTS[p].store(high, Ordering::Relaxed);
        }
    }

    /// Last level written to a simulated output pin.
    pub fn output(pin: i32) -> bool {
        slot(pin).is_some_and(|p| OUTPUTS[p].load(Ordering::Relaxed))
    }

    pub(crate) fn set_duty(channel: u32, duty: u32) {
        if let Some(d) = DUTIES.get(channel as usize) {
            d.store(duty, Ordering::Relaxed);
        }
    }

    /// Last duty written to a simulated LEDC channel.
    pub fn duty(channel: u32) -> u32 {
        DUTIES
            .get(channel as usize)
            .map_or(0, |d| d.load(Ordering::Relaxed))
    }
}
