//! Fixed-capacity blocks of uninitialized slots.
//!
//! A [`RawBlock`] is the only owner of container memory. It knows how many
//! slots it has and how to give them back to its allocator; it has no idea
//! which of them hold values. Capacity is set once at creation: growing a
//! container means building a second block and moving values across.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::alloc::{Allocator, Global};
use crate::error::AllocError;

/// Smallest power of two `>= n`, or `0` for `n == 0`.
///
/// Every block capacity and every growth target is computed here. Returns
/// `None` when the result would not fit in `usize`.
///
/// ```
/// use pvec_raw::capacity_for;
///
/// assert_eq!(capacity_for(0), Some(0));
/// assert_eq!(capacity_for(5), Some(8));
/// assert_eq!(capacity_for(8), Some(8));
/// ```
pub const fn capacity_for(n: usize) -> Option<usize> {
    if n == 0 {
        Some(0)
    } else {
        n.checked_next_power_of_two()
    }
}

/// A run of `capacity` uninitialized `T` slots.
///
/// Blocks cannot be cloned; they are produced by allocation and handed
/// around by move, [`swap`](RawBlock::swap) or [`take`](RawBlock::take).
/// Dropping a block releases its memory without touching slot contents.
pub struct RawBlock<T, A: Allocator = Global> {
    ptr: NonNull<T>,
    capacity: usize,
    alloc: A,
    _slots: PhantomData<T>,
}

// SAFETY: a block is a unique owner of its memory, like `Box<[MaybeUninit<T>]>`.
unsafe impl<T: Send, A: Allocator + Send> Send for RawBlock<T, A> {}
// SAFETY: shared access only hands out raw pointers; no interior mutability.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawBlock<T, A> {}

impl<T> RawBlock<T, Global> {
    /// Allocate a block from the global allocator. See [`RawBlock::new_in`].
    pub fn new(n: usize) -> Result<Self, AllocError> {
        Self::new_in(n, Global)
    }
}

impl<T, A: Allocator> RawBlock<T, A> {
    /// A block with no slots. Allocates nothing.
    pub const fn empty_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            alloc,
            _slots: PhantomData,
        }
    }

    /// Allocate `capacity_for(n)` slots from `alloc`.
    ///
    /// A zero capacity (or a zero-sized `T`) performs no allocation. On
    /// failure nothing has been acquired and `alloc` is dropped.
    pub fn new_in(n: usize, alloc: A) -> Result<Self, AllocError> {
        let capacity = capacity_for(n).ok_or(AllocError::CapacityOverflow { requested: n })?;
        if capacity == 0 {
            return Ok(Self::empty_in(alloc));
        }
        if mem::size_of::<T>() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                alloc,
                _slots: PhantomData,
            });
        }
        let layout = Layout::array::<T>(capacity)
            .map_err(|_| AllocError::CapacityOverflow { requested: n })?;
        let ptr = alloc.allocate(layout)?.cast::<T>();
        Ok(Self {
            ptr,
            capacity,
            alloc,
            _slots: PhantomData,
        })
    }

    /// Number of slots. Always `0` or a power of two.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The allocator this block returns its memory to.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pointer to slot 0. Dangling (but aligned) when nothing is allocated.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be `<= capacity` (`== capacity` yields the one-past-end
    /// pointer, which must not be dereferenced). Whether the slot holds a
    /// value is the caller's bookkeeping.
    pub unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(
            index <= self.capacity,
            "slot {index} out of block capacity {}",
            self.capacity
        );
        // SAFETY: in bounds of (or one past) the allocation per the caller.
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Exchange storage, capacity and allocator with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Move this block's storage out, leaving `self` empty.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self::empty_in(self.alloc.clone());
        mem::replace(self, empty)
    }

    fn layout(&self) -> Option<Layout> {
        if self.capacity == 0 || mem::size_of::<T>() == 0 {
            return None;
        }
        Layout::array::<T>(self.capacity).ok()
    }
}

impl<T, A: Allocator> Drop for RawBlock<T, A> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout() {
            // SAFETY: `ptr` was returned by `self.alloc.allocate(layout)` in
            // `new_in` and capacity never changes afterwards.
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) }
        }
    }
}

impl<T, A: Allocator> fmt::Debug for RawBlock<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBlock")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
