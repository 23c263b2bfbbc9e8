//! Optional, lock-protected counters for monitoring queue activity.
//!
//! Unlike the teacher crate's lock-free `Metrics`, these counters live
//! inside the same mutex as the rest of the queue state — there is no
//! per-core contention to avoid in a design that already serializes every
//! push and pop through one lock. `Metrics::snapshot` hands back a cheap
//! `Copy` of the counters for callers who want a read-out without holding
//! the queue lock any longer than necessary.

/// Running counters updated under the queue's lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Metrics {
    pub(crate) messages_pushed: u64,
    pub(crate) messages_popped: u64,
    pub(crate) grow_events: u64,
    pub(crate) shrink_events: u64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_pushed: self.messages_pushed,
            messages_popped: self.messages_popped,
            grow_events: self.grow_events,
            shrink_events: self.shrink_events,
        }
    }
}

/// A point-in-time read-out of [`Metrics`], detached from the queue's lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_pushed: u64,
    pub messages_popped: u64,
    pub grow_events: u64,
    pub shrink_events: u64,
}
