//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | SwitchPort         | Switch GPIOs             |
//! |                | FanOutputPort      | LEDC PWM, GPIO           |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `time`         | ClockPort          | ESP32 system timer       |
//!
//! The `WakePort` implementation lives in [`crate::power`].

pub mod hardware;
pub mod log_sink;
pub mod time;
