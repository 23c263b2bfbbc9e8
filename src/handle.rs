//! Producer and consumer capabilities minted from a [`crate::Queue`].
//!
//! `Producer<T>` and `Consumer<T>` are distinct types, each holding a
//! counted reference into the same `Inner<T>`. There is no single
//! "handle" type downcast by role the way the C source tagged a raw pointer
//! with a `pipe_producer_t`/`pipe_consumer_t` wrapper struct — the type
//! system enforces which operations are available on which handle.

use std::sync::Arc;

use crate::metrics::MetricsSnapshot;
use crate::queue::Inner;

/// The push-only capability on a queue. Dropping the last `Producer`
/// (across all handles, including the queue's own root handle) wakes any
/// consumer waiting for more input so it can observe end-of-stream.
pub struct Producer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Producer<T> {
    pub(crate) fn new(inner: Arc<Inner<T>>) -> Self {
        Self { inner }
    }
}

impl<T: Copy> Producer<T> {
    /// Enqueues `elems` in order, blocking while full and at least one
    /// consumer remains. Once the last consumer has dropped, this returns
    /// immediately without enqueuing anything.
    pub fn push(&self, elems: &[T]) {
        self.inner.push(elems);
    }

    /// Mints a sibling producer handle sharing the same underlying queue.
    #[must_use]
    pub fn clone_handle(&self) -> Self {
        let mut guard = crate::error::lock_or_recover(&self.inner.state);
        guard.producer_refcount += 1;
        drop(guard);
        Self::new(Arc::clone(&self.inner))
    }

    /// Returns a counters snapshot, or `None` if metrics were not enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.inner.metrics()
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        self.inner.drop_producer();
    }
}

/// The pop-only capability on a queue. Dropping the last `Consumer` (across
/// all handles, including the queue's own root handle) releases the
/// underlying storage immediately, even if producers remain; subsequent
/// pushes on those producers become silent no-ops.
pub struct Consumer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Consumer<T> {
    pub(crate) fn new(inner: Arc<Inner<T>>) -> Self {
        Self { inner }
    }
}

impl<T: Copy> Consumer<T> {
    /// Dequeues up to `dst.len()` elements, blocking until that many are
    /// available or the last producer has dropped. Returns the number
    /// actually dequeued.
    pub fn pop(&self, dst: &mut [T]) -> usize {
        self.inner.pop(dst)
    }

    /// Mints a sibling consumer handle sharing the same underlying queue.
    #[must_use]
    pub fn clone_handle(&self) -> Self {
        let mut guard = crate::error::lock_or_recover(&self.inner.state);
        guard.consumer_refcount += 1;
        drop(guard);
        Self::new(Arc::clone(&self.inner))
    }

    /// Returns a counters snapshot, or `None` if metrics were not enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.inner.metrics()
    }
}

impl<T> Drop for Consumer<T> {
    fn drop(&mut self) {
        self.inner.drop_consumer();
    }
}
