//! Debug assertion macros for the queue's data-model invariants.
//!
//! These check the state invariants documented on [`crate::queue::Queue`]
//! whenever the lock is held by a mutator, after each transaction. They are
//! only active in debug builds (`#[cfg(debug_assertions)]`), so there is
//! zero overhead in release builds.

// =============================================================================
// INV-STATE-01: Storage presence tracks the consumer refcount
// =============================================================================

/// Assert that `storage` is absent exactly when no consumers remain.
///
/// **Invariant**: `storage.is_none() ⟺ consumer_refcount == 0`, and in that
/// case `elem_count == 0` too.
macro_rules! debug_assert_storage_matches_consumers {
    ($storage:expr, $consumer_refcount:expr) => {
        debug_assert!(
            $storage.is_some() == ($consumer_refcount > 0),
            "INV-STATE-01 violated: storage present = {}, consumer_refcount = {}",
            $storage.is_some(),
            $consumer_refcount
        )
    };
}

// =============================================================================
// INV-STATE-02: Cursor range
// =============================================================================

/// Assert that a cursor is within `[0, capacity)`, never equal to `capacity`.
///
/// **Invariant**: cursors are normalized to `0` immediately after any advance
/// that would otherwise leave them equal to `capacity`.
macro_rules! debug_assert_cursor_in_range {
    ($name:literal, $cursor:expr, $capacity:expr) => {
        debug_assert!(
            $cursor < $capacity,
            "INV-STATE-02 violated: cursor {} = {} not in [0, {})",
            $name,
            $cursor,
            $capacity
        )
    };
}

// =============================================================================
// INV-STATE-03/04: elem_count matches the wrap/nowrap cursor layout
// =============================================================================

/// Assert that `elem_count` matches `begin`/`end` under the wrap-aware
/// formula: `end - begin` when `begin <= end`, `(capacity - begin) + end`
/// otherwise.
macro_rules! debug_assert_elem_count_matches_cursors {
    ($elem_count:expr, $begin:expr, $end:expr, $capacity:expr) => {
        debug_assert!(
            $elem_count
                == if $begin <= $end {
                    $end - $begin
                } else {
                    ($capacity - $begin) + $end
                },
            "INV-STATE-03/04 violated: elem_count {} inconsistent with begin {} end {} capacity {}",
            $elem_count,
            $begin,
            $end,
            $capacity
        )
    };
}

// =============================================================================
// INV-STATE-05: Capacity is a bounded power of two
// =============================================================================

/// Assert that `capacity` is a power of two within `[min_cap, max_cap]`.
macro_rules! debug_assert_capacity_bounds {
    ($capacity:expr, $min_cap:expr, $max_cap:expr) => {
        debug_assert!(
            $capacity.is_power_of_two() && $capacity >= $min_cap && $capacity <= $max_cap,
            "INV-STATE-05 violated: capacity {} not a power of two in [{}, {}]",
            $capacity,
            $min_cap,
            $max_cap
        )
    };
}

// =============================================================================
// INV-STATE-06: Refcounts never underflow past zero-then-reuse
// =============================================================================

/// Assert that a refcount decrement does not underflow.
macro_rules! debug_assert_refcount_not_underflowing {
    ($name:literal, $count:expr) => {
        debug_assert!($count > 0, "INV-STATE-06 violated: {} refcount underflowed", $name)
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_capacity_bounds;
pub(crate) use debug_assert_cursor_in_range;
pub(crate) use debug_assert_elem_count_matches_cursors;
pub(crate) use debug_assert_refcount_not_underflowing;
pub(crate) use debug_assert_storage_matches_consumers;
