//! ESP32 time adapter.
//!
//! Provides the monotonic millisecond clock behind [`ClockPort`].
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, kept running
//!   across light sleep).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Either source is passed through [`MonotonicMillis`], which holds the
//! reading steady if the raw source ever steps backwards.

use core::cell::Cell;

use log::warn;

use crate::app::ports::ClockPort;

/// Regression guard over a raw millisecond source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonotonicMillis {
    last: u64,
    offset: u64,
}

impl MonotonicMillis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw reading and get the corrected one.  A backwards step is
    /// absorbed into the offset so the result never decreases.
    pub fn observe(&mut self, raw_ms: u64) -> u64 {
        let corrected = raw_ms.saturating_add(self.offset);
        if corrected < self.last {
            warn!(
                "clock: raw source stepped back {} ms, compensating",
                self.last - corrected
            );
            self.offset += self.last - corrected;
            return self.last;
        }
        self.last = corrected;
        corrected
    }
}

/// Monotonic clock for the ESP32-S3 platform.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    guard: Cell<MonotonicMillis>,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            guard: Cell::new(MonotonicMillis::new()),
        }
    }

    /// Milliseconds since boot from the raw source.
    #[cfg(target_os = "espidf")]
    fn raw_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads a free-running counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }).max(0) as u64 / 1_000
    }

    /// Milliseconds since boot from the raw source.
    #[cfg(not(target_os = "espidf"))]
    fn raw_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl ClockPort for MonotonicClock {
    fn now_ms(&self) -> u64 {
        let mut guard = self.guard.get();
        let now = guard.observe(self.raw_ms());
        self.guard.set(guard);
        now
    }
}
