//! Construction-time sizing knobs for a [`crate::Queue`].
//!
//! The source this crate reimplements took a single `limit` argument to
//! `pipe_new`; everything else was a compile-time constant. `QueueConfig`
//! keeps that same small surface but makes the sizing floor and the metrics
//! toggle explicit and named, in the spirit of the teacher crate's
//! `Config`/`LOW_LATENCY_CONFIG`/`HIGH_THROUGHPUT_CONFIG` split.

/// The built-in capacity floor in release builds.
#[cfg(not(debug_assertions))]
pub const BUILTIN_MIN_CAP: usize = 32;

/// The built-in capacity floor in debug builds, small enough to exercise
/// grow and shrink transitions quickly in tests.
#[cfg(debug_assertions)]
pub const BUILTIN_MIN_CAP: usize = 2;

/// The floor `QueueConfig::default()` starts from before any per-queue
/// `limit` is applied. Equal to [`BUILTIN_MIN_CAP`]: nothing below it is
/// ever reachable regardless of what a caller requests.
pub const DEFAULT_MIN_CAP: usize = BUILTIN_MIN_CAP;

/// Sizing and feature configuration for a new [`crate::Queue`].
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Upper bound on buffered elements. `usize::MAX` means unbounded.
    pub limit: usize,
    /// Lower bound on storage capacity; clamped up to [`BUILTIN_MIN_CAP`]
    /// and back down to `limit` if `limit` is smaller than that floor.
    pub min_cap: usize,
    /// Whether to maintain queue counters, read via [`crate::Queue::metrics`].
    pub enable_metrics: bool,
}

impl QueueConfig {
    /// A bounded queue holding at most `limit` elements. `min_cap` is
    /// lowered to `limit` when `limit` is smaller than the default floor, so
    /// a small `limit` is not silently inflated back up by the default.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self { limit, min_cap: DEFAULT_MIN_CAP.min(limit), ..Self::default() }
    }

    /// An effectively unbounded queue (`limit == usize::MAX`).
    #[must_use]
    pub fn unbounded() -> Self {
        Self { limit: usize::MAX, ..Self::default() }
    }

    /// The `min_cap` a freshly constructed `Queue` actually starts from:
    /// the built-in floor, unless `limit` itself is smaller, in which case
    /// `min_cap` cannot exceed it (`min_cap <= capacity <= max_cap` must
    /// stay satisfiable). This is why `bounded()` pre-lowers `min_cap` for
    /// a small `limit` instead of leaving it at the default — without that
    /// clamp here, `max(BUILTIN_MIN_CAP)` alone would put the floor back
    /// above `limit` for every `bounded(n)` with `n` under the floor.
    pub(crate) fn effective_min_cap(&self) -> usize {
        self.min_cap.max(BUILTIN_MIN_CAP).min(self.limit)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            limit: usize::MAX,
            min_cap: DEFAULT_MIN_CAP,
            enable_metrics: false,
        }
    }
}
