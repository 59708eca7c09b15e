//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - GPIO ISRs on the four switch pins (any edge)
//! - The power manager, when a light-sleep wake was caused by a switch pin
//!
//! Events are consumed by the main control loop, which drains them before
//! every tick.  ISR context never touches the state machine.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Switch ISR  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Sleep wake  │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use heapless::mpmc::MpMcQueue;

/// Maximum number of pending events.  Must be a power of 2.
const EVENT_QUEUE_CAP: usize = 16;

/// Which switch produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchGroup {
    Mode,
    Intensity,
}

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    /// A switch pin changed level.  Debouncing happens in the main loop.
    SwitchEdge(SwitchGroup),
    /// Woke from light sleep on a switch pin; the pin that fired is unknown.
    SwitchWake,
}

// ── Lock-free MPMC queue ──────────────────────────────────────
//
// ISRs and the sleep path write (produce), main loop reads (consume).
// Kept in a static so ISR callbacks can reach it.

static EVENT_QUEUE: MpMcQueue<SystemEvent, EVENT_QUEUE_CAP> = MpMcQueue::new();
static PENDING: AtomicBool = AtomicBool::new(false);
static DROPPED: AtomicU32 = AtomicU32::new(0);

/// Push an event into the queue.
/// Safe to call from ISR context (lock-free).
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: SystemEvent) -> bool {
    let ok = EVENT_QUEUE.enqueue(event).is_ok();
    if ok {
        PENDING.store(true, Ordering::Release);
    } else {
        DROPPED.fetch_add(1, Ordering::Relaxed);
    }
    ok
}

/// Pop the next event from the queue.
/// Returns `None` if the queue is empty.
pub fn pop_event() -> Option<SystemEvent> {
    EVENT_QUEUE.dequeue()
}

/// Drain all pending events into a callback.
/// Processes events in FIFO order.
pub fn drain_events(mut handler: impl FnMut(SystemEvent)) {
    PENDING.store(false, Ordering::Release);
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Whether an event was pushed since the last drain.  Cheap enough to poll
/// from an idle loop.
pub fn has_pending() -> bool {
    PENDING.load(Ordering::Acquire)
}

/// Take and reset the count of events dropped on a full queue.
pub fn take_dropped() -> u32 {
    DROPPED.swap(0, Ordering::Relaxed)
}
