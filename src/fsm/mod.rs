//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern, driven by discrete events:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌─────────────┬──────────┬──────────┬──────────────────────┐ │
//! │  │ FanState    │ on_enter │ on_exit  │ on_event             │ │
//! │  ├─────────────┼──────────┼──────────┼──────────────────────┤ │
//! │  │ Off         │ fn(ctx)  │    -     │ fn(ctx, ev)->Option<>│ │
//! │  │ SpeedingUp  │    -     │    -     │ fn(ctx, ev)->Option<>│ │
//! │  │ Steady      │ fn(ctx)  │    -     │ fn(ctx, ev)->Option<>│ │
//! │  │ SlowingDown │    -     │    -     │ fn(ctx, ev)->Option<>│ │
//! │  │ Pausing     │ fn(ctx)  │ fn(ctx)  │ fn(ctx, ev)->Option<>│ │
//! │  └─────────────┴──────────┴──────────┴──────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each dispatched event calls `on_event` for the **current** state.  If it
//! returns `Some(next)` with `next != current`, the engine runs `on_exit`
//! for the current state, then `on_enter` for the next, and updates the
//! current pointer.  `Some(current)` and `None` both mean "stay".  All
//! functions receive `&mut FanContext` which holds the switch snapshot,
//! output commands, ramp, interval timing and config.

pub mod context;
pub mod states;

use context::FanContext;
use log::{debug, info};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Fan operating state.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FanState {
    Off = 0,
    SpeedingUp = 1,
    Steady = 2,
    SlowingDown = 3,
    Pausing = 4,
}

impl FanState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `FanState`.  Panics on out-of-range in
    /// debug builds; returns `Off` in release (fan unpowered).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::SpeedingUp,
            2 => Self::Steady,
            3 => Self::SlowingDown,
            4 => Self::Pausing,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Off
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::SpeedingUp => "SpeedingUp",
            Self::Steady => "Steady",
            Self::SlowingDown => "SlowingDown",
            Self::Pausing => "Pausing",
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Stimulus fed to the state machine.  Carries no payload: guards read the
/// switch snapshot in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    None,
    ModeChanged,
    IntensityChanged,
    TargetSpeedReached,
    IntervalPhaseEnded,
}

impl Event {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ModeChanged => "ModeChanged",
            Self::IntensityChanged => "IntensityChanged",
            Self::TargetSpeedReached => "TargetSpeedReached",
            Self::IntervalPhaseEnded => "IntervalPhaseEnded",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FanContext);

/// Signature for the event handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateEventFn = fn(&mut FanContext, Event) -> Option<FanState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: FanState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_event: StateEventFn,
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: FanState,
    pub to: FanState,
    pub cause: Event,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the
/// [`FanContext`] is threaded through every handler call by the owner.
pub struct Fsm {
    /// Fixed-size table indexed by `FanState as usize`.
    table: [StateDescriptor; FanState::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Number of transitions taken since start (wraps at u32::MAX).
    transitions: u32,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; FanState::COUNT], initial: FanState) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut FanContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Feed one event to the current state.
    ///
    /// Returns the transition taken, or `None` when the machine stayed put
    /// (including `Event::None`, which never reaches a handler).
    pub fn dispatch(&mut self, event: Event, ctx: &mut FanContext) -> Option<Transition> {
        if event == Event::None {
            return None;
        }
        let from = self.current_state();
        let next = (self.table[self.current].on_event)(ctx, event);
        match next {
            Some(to) if to != from => {
                self.transition(to, event, ctx);
                Some(Transition {
                    from,
                    to,
                    cause: event,
                })
            }
            _ => {
                debug!("FSM: {} ignored/absorbed {}", from.name(), event.name());
                None
            }
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> FanState {
        FanState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: FanState, cause: Event, ctx: &mut FanContext) {
        let next_idx = next_id as usize;

        self.transitions = self.transitions.wrapping_add(1);
        info!(
            "FSM #{}: {} --[{}]--> {}",
            self.transitions,
            self.table[self.current].name,
            cause.name(),
            self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
