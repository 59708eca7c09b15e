//! GPIO / peripheral pin assignments for the fan controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Fan output stage
// ---------------------------------------------------------------------------

/// LEDC PWM output to the fan MOSFET gate driver.
pub const FAN_PWM_GPIO: i32 = 1;
/// Digital output: HIGH = fan supply enabled (high-side switch).
pub const FAN_POWER_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Status LED (discrete, active HIGH)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Tri-state switches (SPDT centre-off, pins to GND, internal pull-ups)
// ---------------------------------------------------------------------------

/// Mode switch, first throw.
pub const MODE_P1_GPIO: i32 = 4;
/// Mode switch, second throw.
pub const MODE_P2_GPIO: i32 = 5;
/// Intensity switch, first throw.
pub const INTENSITY_P1_GPIO: i32 = 6;
/// Intensity switch, second throw.
pub const INTENSITY_P2_GPIO: i32 = 7;

/// Every switch input, for bulk configuration and wakeup setup.
pub const SWITCH_GPIOS: [i32; 4] = [
    MODE_P1_GPIO,
    MODE_P2_GPIO,
    INTENSITY_P1_GPIO,
    INTENSITY_P2_GPIO,
];

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the fan (25 kHz — inaudible, 4-wire fan spec).
pub const FAN_PWM_FREQ_HZ: u32 = 25_000;
/// LEDC channel driving the fan.
pub const LEDC_CH_FAN: u32 = 0;
