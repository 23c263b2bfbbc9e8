//! The shared queue state: one ring buffer, one mutex, two condition
//! variables, and the two independent handle refcounts.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::config::QueueConfig;
use crate::error::lock_or_recover;
use crate::handle::{Consumer, Producer};
use crate::invariants::{
    debug_assert_capacity_bounds, debug_assert_refcount_not_underflowing, debug_assert_storage_matches_consumers,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::resize::{grow_target, next_pow2, shrink_target};
use crate::ring_buffer::RingBuffer;

fn largest_pow2_at_most(n: usize) -> usize {
    if n.is_power_of_two() {
        return n;
    }
    match n.checked_add(1).and_then(usize::checked_next_power_of_two) {
        Some(p) => p / 2,
        None => 1 << (usize::BITS - 1),
    }
}

pub(crate) struct State<T> {
    pub(crate) storage: Option<RingBuffer<T>>,
    pub(crate) min_cap: usize,
    pub(crate) producer_refcount: usize,
    pub(crate) consumer_refcount: usize,
    pub(crate) metrics: Metrics,
}

pub(crate) struct Inner<T> {
    pub(crate) state: Mutex<State<T>>,
    pub(crate) just_pushed: Condvar,
    pub(crate) just_popped: Condvar,
    pub(crate) max_cap: usize,
    pub(crate) metrics_enabled: bool,
}

impl<T: Copy> Inner<T> {
    fn wait_for_popped<'a>(&self, guard: MutexGuard<'a, State<T>>) -> MutexGuard<'a, State<T>> {
        match self.just_popped.wait(guard) {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn wait_for_pushed<'a>(&self, guard: MutexGuard<'a, State<T>>) -> MutexGuard<'a, State<T>> {
        match self.just_pushed.wait(guard) {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check_invariants(state: &State<T>, max_cap: usize) {
        debug_assert_storage_matches_consumers!(state.storage, state.consumer_refcount);
        if let Some(storage) = state.storage.as_ref() {
            debug_assert_capacity_bounds!(storage.capacity(), state.min_cap, max_cap);
        }
    }

    /// Blocking push of `elems` in order. Silently drops the payload once no
    /// consumer remains — that is the documented end-of-pipe behavior, not
    /// an error.
    pub(crate) fn push(&self, elems: &[T]) {
        let mut offset = 0;
        while offset < elems.len() {
            let mut guard = lock_or_recover(&self.state);
            loop {
                let elem_count = guard.storage.as_ref().map_or(0, RingBuffer::len);
                if elem_count < self.max_cap || guard.consumer_refcount == 0 {
                    break;
                }
                guard = self.wait_for_popped(guard);
            }

            if guard.consumer_refcount == 0 {
                return;
            }

            let elem_count = guard.storage.as_ref().map_or(0, RingBuffer::len);
            let room = self.max_cap - elem_count;
            let k = (elems.len() - offset).min(room);

            let storage = guard
                .storage
                .as_mut()
                .expect("storage is present while consumer_refcount > 0");

            if let Some(target) = grow_target(elem_count, k, storage.capacity(), self.max_cap) {
                storage.resize(target);
                guard.metrics.grow_events += 1;
                tracing::debug!(new_capacity = target, "queue grew");
            }

            let storage = guard.storage.as_mut().unwrap();
            storage.copy_in(&elems[offset..offset + k], k);
            if self.metrics_enabled {
                guard.metrics.messages_pushed += k as u64;
            }

            debug_assert!(storage.len() <= storage.capacity());

            Self::check_invariants(&guard, self.max_cap);
            drop(guard);
            self.just_pushed.notify_all();

            offset += k;
        }
    }

    /// Blocking pop of up to `dst.len()` elements. Returns the number
    /// actually dequeued, which is short (possibly zero) once the last
    /// producer has dropped and no more elements remain.
    pub(crate) fn pop(&self, dst: &mut [T]) -> usize {
        let count = dst.len().min(self.max_cap);
        let mut guard = lock_or_recover(&self.state);

        loop {
            let elem_count = guard.storage.as_ref().map_or(0, RingBuffer::len);
            if elem_count >= count || guard.producer_refcount == 0 {
                break;
            }
            guard = self.wait_for_pushed(guard);
        }

        let elem_count = guard.storage.as_ref().map_or(0, RingBuffer::len);
        let r = count.min(elem_count);

        if r > 0 {
            let storage = guard.storage.as_mut().expect("consumer holds storage alive");
            storage.copy_out(&mut dst[..r], r);
            if self.metrics_enabled {
                guard.metrics.messages_popped += r as u64;
            }

            let elem_count = storage.len();
            let capacity = storage.capacity();
            let min_cap = guard.min_cap;
            if let Some(target) = shrink_target(elem_count, capacity, min_cap) {
                storage.resize(target);
                guard.metrics.shrink_events += 1;
                tracing::debug!(new_capacity = target, "queue shrank");
            }
        }

        Self::check_invariants(&guard, self.max_cap);
        drop(guard);
        self.just_popped.notify_all();
        r
    }

    /// Raises `min_cap` to `min(n, max_cap)` and eagerly grows storage to
    /// meet it. `n == 0` is first substituted with the built-in floor, the
    /// same way `pipe_reserve` (`examples/original_source/pipe.c`)
    /// substitutes `count = DEFAULT_MINCAP` before doing anything else.
    ///
    /// The whole operation — including the `min_cap` write, not just the
    /// resize — is then a no-op once that (possibly substituted) request is
    /// already satisfied by what's buffered, mirroring `pipe_reserve`'s
    /// `if (count <= p->elem_count) return;` gate under its lock. Without
    /// this, a later `reserve` call with a smaller `n` would silently
    /// discard an earlier, still-relevant reservation.
    pub(crate) fn reserve(&self, n: usize) {
        let mut guard = lock_or_recover(&self.state);

        let n = if n == 0 { crate::config::BUILTIN_MIN_CAP } else { n };

        let elem_count = guard.storage.as_ref().map_or(0, RingBuffer::len);
        if n <= elem_count {
            return;
        }

        let target_min = n.max(crate::config::BUILTIN_MIN_CAP).min(self.max_cap);
        guard.min_cap = target_min;

        if let Some(storage) = guard.storage.as_mut() {
            let target_cap = next_pow2(target_min).min(self.max_cap);
            if target_cap > storage.capacity() {
                storage.resize(target_cap);
                tracing::debug!(new_capacity = target_cap, "queue reserved");
            }
        }
    }

    pub(crate) fn metrics(&self) -> Option<MetricsSnapshot> {
        if !self.metrics_enabled {
            return None;
        }
        let guard = lock_or_recover(&self.state);
        Some(guard.metrics.snapshot())
    }
}

/// A producer/consumer ring queue of `T`, dynamically resizing between
/// `config.min_cap` and `config.limit`.
///
/// `Queue::new` returns the *root handle*: it counts as one [`Producer`] and
/// one [`Consumer`] simultaneously. Additional handles of either kind are
/// minted with [`Queue::producer_handle`] and [`Queue::consumer_handle`];
/// dropping the root handle releases both counts it holds.
pub struct Queue<T> {
    pub(crate) inner: Arc<Inner<T>>,
}

impl<T: Copy> Queue<T> {
    /// Creates a new queue from `config`, with both refcounts initialized to
    /// one (the root handle returned here).
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        let min_cap = config.effective_min_cap();
        let max_cap = config.limit.max(min_cap);
        // max_cap bounds elements, not storage slots, so its own next power
        // of two can legitimately exceed it (e.g. limit == 5); clamp down so
        // the freshly allocated buffer never starts out over the cap.
        let initial_capacity = min_cap.next_power_of_two().min(largest_pow2_at_most(max_cap));

        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                storage: Some(RingBuffer::new(initial_capacity)),
                min_cap,
                producer_refcount: 1,
                consumer_refcount: 1,
                metrics: Metrics::new(),
            }),
            just_pushed: Condvar::new(),
            just_popped: Condvar::new(),
            max_cap,
            metrics_enabled: config.enable_metrics,
        });

        tracing::debug!(max_cap, min_cap, "queue created");
        Self { inner }
    }

    /// Enqueues `elems` in order, blocking while full and consumers remain.
    pub fn push(&self, elems: &[T]) {
        self.inner.push(elems);
    }

    /// Dequeues up to `dst.len()` elements, blocking until that many are
    /// available or no producer remains. Returns the number dequeued.
    pub fn pop(&self, dst: &mut [T]) -> usize {
        self.inner.pop(dst)
    }

    /// Raises the capacity floor; see [`Inner::reserve`].
    pub fn reserve(&self, n: usize) {
        self.inner.reserve(n);
    }

    /// Returns a counters snapshot, or `None` if metrics were not enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.inner.metrics()
    }

    /// Mints an additional producer handle, incrementing the producer
    /// refcount.
    #[must_use]
    pub fn producer_handle(&self) -> Producer<T> {
        let mut guard = lock_or_recover(&self.inner.state);
        guard.producer_refcount += 1;
        drop(guard);
        Producer::new(Arc::clone(&self.inner))
    }

    /// Mints an additional consumer handle, incrementing the consumer
    /// refcount.
    #[must_use]
    pub fn consumer_handle(&self) -> Consumer<T> {
        let mut guard = lock_or_recover(&self.inner.state);
        guard.consumer_refcount += 1;
        drop(guard);
        Consumer::new(Arc::clone(&self.inner))
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        self.inner.drop_producer();
        self.inner.drop_consumer();
    }
}

// These live on an unbounded `impl<T> Inner<T>` (rather than alongside
// `push`/`pop` on the `T: Copy` impl) because `Queue<T>`'s own `Drop` impl
// cannot add a `T: Copy` bound the struct definition doesn't carry — Rust
// rejects a `Drop` impl with stricter bounds than its type. `Producer`/
// `Consumer` share the same methods so the refcount bookkeeping has one
// definition.
impl<T> Inner<T> {
    pub(crate) fn drop_producer(&self) {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        debug_assert_refcount_not_underflowing!("producer", guard.producer_refcount);
        guard.producer_refcount -= 1;
        let became_zero = guard.producer_refcount == 0;
        drop(guard);
        if became_zero {
            tracing::debug!("last producer dropped");
            self.just_pushed.notify_all();
        }
    }

    pub(crate) fn drop_consumer(&self) {
        let mut guard = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        debug_assert_refcount_not_underflowing!("consumer", guard.consumer_refcount);
        guard.consumer_refcount -= 1;
        let became_zero = guard.consumer_refcount == 0;
        if became_zero {
            guard.storage = None;
        }
        drop(guard);
        if became_zero {
            tracing::debug!("last consumer dropped, storage released");
            self.just_popped.notify_all();
        }
    }
}
