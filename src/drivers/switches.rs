//! Tri-state mode and intensity switch driver.
//!
//! ## Hardware
//!
//! Two SPDT centre-off switches, each throw shorted to GND, read on two
//! pulled-up GPIOs per switch.  A throw reads LOW when selected; the centre
//! position leaves both pins HIGH.
//!
//! | p1 | p2 | Mode       | Intensity |
//! |----|----|------------|-----------|
//! | L  | H  | Interval   | Low       |
//! | H  | L  | Continuous | High      |
//! | H  | H  | Off        | Medium    |
//! | L  | L  | Off        | Medium    |
//!
//! `L L` cannot happen on a healthy switch; it decodes to the same safe
//! reading as centre.
//!
//! ## Debounce
//!
//! GPIO ISRs fire on any edge and only push a queue event; the main loop
//! calls [`SwitchBank::note_edge`] for each one.  Every edge restarts the
//! debounce window, and [`SwitchBank::poll`] re-reads the pins once the
//! window has been quiet for `debounce_ms`.

use embedded_hal::digital::InputPin;
use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::SwitchPort;
use crate::fsm::Event;
use crate::fsm::context::{Intensity, Mode};

/// Decode the mode switch from its two pin levels (`true` = HIGH).
pub fn decode_mode(p1: bool, p2: bool) -> Mode {
    match (p1, p2) {
        (false, true) => Mode::Interval,
        (true, false) => Mode::Continuous,
        _ => Mode::Off,
    }
}

/// Decode the intensity switch from its two pin levels (`true` = HIGH).
pub fn decode_intensity(p1: bool, p2: bool) -> Intensity {
    match (p1, p2) {
        (false, true) => Intensity::Low,
        (true, false) => Intensity::High,
        _ => Intensity::Medium,
    }
}

/// Both throws of one switch.
struct SwitchPins<P> {
    p1: P,
    p2: P,
}

impl<P: InputPin> SwitchPins<P> {
    /// Read both throws.  A failed read counts as HIGH (the idle level),
    /// which decodes to the safe centre position.
    fn levels(&mut self) -> (bool, bool) {
        (read_level(&mut self.p1), read_level(&mut self.p2))
    }
}

fn read_level<P: InputPin>(pin: &mut P) -> bool {
    pin.is_high().unwrap_or_else(|_| {
        warn!("switch: pin read failed, assuming released");
        true
    })
}

pub struct SwitchBank<P> {
    mode_pins: SwitchPins<P>,
    intensity_pins: SwitchPins<P>,
    mode: Mode,
    intensity: Intensity,
    debounce_ms: u32,
    /// Time of the latest unprocessed edge.
    edge_at_ms: Option<u64>,
}

impl<P: InputPin> SwitchBank<P> {
    /// Take ownership of the four pins and latch their current positions.
    pub fn new(mode_p1: P, mode_p2: P, intensity_p1: P, intensity_p2: P, debounce_ms: u32) -> Self {
        let mut bank = Self {
            mode_pins: SwitchPins {
                p1: mode_p1,
                p2: mode_p2,
            },
            intensity_pins: SwitchPins {
                p1: intensity_p1,
                p2: intensity_p2,
            },
            mode: Mode::Undefined,
            intensity: Intensity::Undefined,
            debounce_ms,
            edge_at_ms: None,
        };
        let (m1, m2) = bank.mode_pins.levels();
        let (i1, i2) = bank.intensity_pins.levels();
        bank.mode = decode_mode(m1, m2);
        bank.intensity = decode_intensity(i1, i2);
        bank
    }

    /// Record a pin edge seen at `now_ms`.  Restarts the debounce window.
    pub fn note_edge(&mut self, now_ms: u64) {
        self.edge_at_ms = Some(now_ms);
    }

    /// Time until a pending edge settles, or `None` with nothing pending.
    pub fn next_poll_in(&self, now_ms: u64) -> Option<u64> {
        self.edge_at_ms.map(|at| {
            at.saturating_add(u64::from(self.debounce_ms))
                .saturating_sub(now_ms)
        })
    }

    /// Re-read the switches if a pending edge has settled and report what
    /// changed.  `ModeChanged` comes first when both switches moved.
    pub fn poll(&mut self, now_ms: u64) -> Vec<Event, 2> {
        let mut changes = Vec::new();
        if self.next_poll_in(now_ms) != Some(0) {
            return changes;
        }
        self.edge_at_ms = None;

        let (m1, m2) = self.mode_pins.levels();
        let (i1, i2) = self.intensity_pins.levels();
        let mode = decode_mode(m1, m2);
        let intensity = decode_intensity(i1, i2);

        // Capacity is exactly two; pushes cannot fail.
        if mode != self.mode {
            debug!("switch: mode {} -> {}", self.mode.name(), mode.name());
            self.mode = mode;
            let _ = changes.push(Event::ModeChanged);
        }
        if intensity != self.intensity {
            debug!(
                "switch: intensity {} -> {}",
                self.intensity.name(),
                intensity.name()
            );
            self.intensity = intensity;
            let _ = changes.push(Event::IntensityChanged);
        }
        changes
    }
}

impl<P> SwitchPort for SwitchBank<P> {
    fn current_mode(&self) -> Mode {
        self.mode
    }

    fn current_intensity(&self) -> Intensity {
        self.intensity
    }
}
