//! Error taxonomy for conditions that are recoverable rather than
//! assertion-worthy.
//!
//! Most of what can go wrong in this crate is a programmer error (an
//! underflowing refcount, a cursor escaping `[0, capacity)`) and is caught by
//! the `debug_assert_*!` macros in [`crate::invariants`] instead of living
//! here. `QueueError` exists for the one condition a `Mutex`-based design
//! introduces that the lock-free original never had to think about: a
//! poisoned lock.

use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Recoverable error conditions surfaced by a [`crate::Queue`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// The internal mutex was poisoned by a thread that panicked while
    /// holding it. The guard is still recovered and the operation proceeds;
    /// this variant exists so the event is something callers *can* observe
    /// via logs rather than something silently swallowed.
    #[error("queue mutex was poisoned by a panicking holder")]
    PoisonedLock,
}

/// Locks `mutex`, recovering the guard (and logging) if it was poisoned.
///
/// The C source this crate reimplements has no notion of poisoning — its
/// mutex just gets re-locked by the next thread. We preserve that
/// forward-progress behavior deliberately: a panic inside the critical
/// section has already corrupted at most the in-progress transaction, and
/// the invariant checks in [`crate::invariants`] run after the lock is
/// reacquired, so a corrupted state tends to be caught in debug builds.
pub(crate) fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("recovering poisoned queue mutex");
            recover(poisoned)
        }
    }
}

fn recover<T>(poisoned: PoisonError<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    poisoned.into_inner()
}
