//! The circular storage underlying a [`crate::Queue`].
//!
//! `RingBuffer<T>` is pure data: it has no lock of its own and every method
//! here is called by `Queue` with its mutex already held. The wrap/nowrap
//! split documented below is lifted directly from the C `pipe_t` this crate
//! reimplements; only the unit (elements, not bytes) changed, since `T`
//! already carries its own size.
//!
//! ```text
//! Nowrap:
//!     storage         begin               end                bufend
//!       [               >==================>                    ]
//!
//! Wrap:
//!     storage       end                 begin                 bufend
//!       [============>                    >=====================]
//! ```

use std::mem::MaybeUninit;

use crate::invariants::{debug_assert_cursor_in_range, debug_assert_elem_count_matches_cursors};

/// Fixed-capacity circular storage for `T`. Slots outside `[begin, end)`
/// (wrap-aware) are not guaranteed to hold initialized values.
pub struct RingBuffer<T> {
    storage: Box<[MaybeUninit<T>]>,
    begin: usize,
    end: usize,
    elem_count: usize,
}

impl<T: Copy> RingBuffer<T> {
    /// Allocates a new buffer of `capacity` elements, initially empty.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity must be nonzero");
        let mut storage = Vec::with_capacity(capacity);
        storage.resize_with(capacity, MaybeUninit::uninit);
        Self {
            storage: storage.into_boxed_slice(),
            begin: 0,
            end: 0,
            elem_count: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elem_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elem_count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.elem_count == self.capacity()
    }

    /// Whether the in-use region straddles the physical end of storage.
    ///
    /// Not simply `begin > end`: when the buffer is exactly full, `begin`
    /// and `end` are both normalized to the same cursor value, so the two
    /// cursors alone cannot distinguish "full and wrapped" from "empty".
    /// `elem_count` breaks the tie.
    #[inline]
    fn wraps_around(&self) -> bool {
        self.begin + self.elem_count > self.capacity()
    }

    #[inline]
    fn wrap_if_at_end(&self, pos: usize) -> usize {
        if pos == self.capacity() {
            0
        } else {
            pos
        }
    }

    /// Appends `n` elements from `src` (`src.len() >= n`). Caller guarantees
    /// `elem_count + n <= capacity`.
    pub fn copy_in(&mut self, src: &[T], n: usize) {
        debug_assert!(self.elem_count + n <= self.capacity());
        debug_assert!(src.len() >= n);

        let capacity = self.capacity();
        let mut end = self.end;
        let mut remaining = n;
        let mut src_off = 0;

        if remaining > 0 {
            let run = remaining.min(capacity - end);
            for i in 0..run {
                self.storage[end + i] = MaybeUninit::new(src[src_off + i]);
            }
            end = self.wrap_if_at_end(end + run);
            src_off += run;
            remaining -= run;
        }

        if remaining > 0 {
            for i in 0..remaining {
                self.storage[i] = MaybeUninit::new(src[src_off + i]);
            }
            end = self.wrap_if_at_end(remaining);
        }

        self.end = end;
        self.elem_count += n;

        debug_assert_cursor_in_range!("end", self.end, capacity);
        debug_assert_elem_count_matches_cursors!(self.elem_count, self.begin, self.end, capacity);
    }

    /// Removes the `n` oldest elements into `dst` (`dst.len() >= n`). Caller
    /// guarantees `n <= elem_count`.
    pub fn copy_out(&mut self, dst: &mut [T], n: usize) {
        debug_assert!(n <= self.elem_count);
        debug_assert!(dst.len() >= n);

        let capacity = self.capacity();
        let mut begin = self.begin;
        let mut remaining = n;
        let mut dst_off = 0;

        if remaining > 0 {
            let run = remaining.min(capacity - begin);
            for i in 0..run {
                // SAFETY: slots in [begin, begin+run) were written by a prior
                // copy_in and not yet consumed, so they are initialized.
                dst[dst_off + i] = unsafe { self.storage[begin + i].assume_init() };
            }
            begin = self.wrap_if_at_end(begin + run);
            dst_off += run;
            remaining -= run;
        }

        if remaining > 0 {
            for i in 0..remaining {
                dst[dst_off + i] = unsafe { self.storage[i].assume_init() };
            }
            begin = self.wrap_if_at_end(remaining);
        }

        self.begin = begin;
        self.elem_count -= n;

        debug_assert_cursor_in_range!("begin", self.begin, capacity);
        debug_assert_elem_count_matches_cursors!(self.elem_count, self.begin, self.end, capacity);
    }

    /// Copies every buffered element into `dst`, starting at offset 0, in
    /// queue order. `dst.len() >= elem_count` is required.
    pub fn peek_linearize(&self, dst: &mut [T]) {
        debug_assert!(dst.len() >= self.elem_count);

        if self.elem_count == 0 {
            return;
        }

        let capacity = self.capacity();
        if !self.wraps_around() {
            for i in 0..self.elem_count {
                dst[i] = unsafe { self.storage[self.begin + i].assume_init() };
            }
            return;
        }

        let first_run = capacity - self.begin;
        for i in 0..first_run {
            dst[i] = unsafe { self.storage[self.begin + i].assume_init() };
        }
        for i in 0..self.end {
            dst[first_run + i] = unsafe { self.storage[i].assume_init() };
        }
    }

    /// Resizes to a new buffer of `new_capacity` elements (must be able to
    /// hold the current contents), relinearizing so that post-resize
    /// `begin = 0` and `end = elem_count`.
    pub fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.elem_count);

        let mut new_storage = Vec::with_capacity(new_capacity);
        new_storage.resize_with(new_capacity, MaybeUninit::uninit);

        if self.elem_count > 0 {
            let count = self.elem_count;
            let capacity = self.capacity();
            if !self.wraps_around() {
                new_storage[..count].copy_from_slice(&self.storage[self.begin..self.begin + count]);
            } else {
                let first_run = capacity - self.begin;
                new_storage[..first_run].copy_from_slice(&self.storage[self.begin..capacity]);
                new_storage[first_run..count].copy_from_slice(&self.storage[..self.end]);
            }
        }

        self.storage = new_storage.into_boxed_slice();
        self.begin = 0;
        self.end = self.elem_count;
        if self.end == new_capacity {
            self.end = 0;
        }

        debug_assert_cursor_in_range!("end", self.end, new_capacity);
        debug_assert_elem_count_matches_cursors!(self.elem_count, self.begin, self.end, new_capacity);
    }
}
