//! The growable container.
//!
//! [`GrowVec`] keeps live elements in slots `[0, len)` of a single
//! [`RawBlock`]; slots `[len, capacity)` are never read or dropped. Every
//! operation that builds elements does so under a [`FillGuard`], and every
//! operation that needs more room builds the new block (including any new
//! tail elements) before touching the receiver. A failure, whether an
//! allocator refusal, a constructor `Err` or a constructor panic, therefore
//! leaves the container exactly as it was.

#![allow(unsafe_code)]

use std::convert::Infallible;
use std::mem;
use std::ptr;
use std::slice;

use pvec_raw::{capacity_for, AllocError, Allocator, Global, RawBlock};
use tracing::{debug, trace};

use crate::error::{PushError, VecError};
use crate::guard::FillGuard;
use crate::metrics::GrowthMetrics;

/// A contiguous growable sequence with power-of-two capacity.
///
/// `A` is the allocator every block of this container comes from. It must
/// be `Clone` so that replacement blocks are drawn from the same source.
pub struct GrowVec<T, A: Allocator = Global> {
    block: RawBlock<T, A>,
    len: usize,
    metrics: GrowthMetrics,
}

/// Acquire a block for `n` slots, recording the outcome in `metrics`.
fn acquire<T, A: Allocator>(
    n: usize,
    alloc: A,
    metrics: &mut GrowthMetrics,
) -> Result<RawBlock<T, A>, AllocError> {
    match RawBlock::new_in(n, alloc) {
        Ok(block) => {
            if block.capacity() != 0 && mem::size_of::<T>() != 0 {
                metrics.block_allocations += 1;
            }
            Ok(block)
        }
        Err(err) => {
            metrics.failed_allocations += 1;
            debug!(requested = n, error = %err, "block allocation refused");
            Err(err)
        }
    }
}

impl<T> GrowVec<T, Global> {
    /// An empty container. Allocates nothing.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// `n` default-constructed elements. See [`GrowVec::with_len_in`].
    pub fn with_len(n: usize) -> Result<Self, VecError>
    where
        T: Default,
    {
        Self::with_len_in(n, Global)
    }

    /// `n` clones of `value`. See [`GrowVec::from_elem_in`].
    pub fn from_elem(n: usize, value: &T) -> Result<Self, VecError>
    where
        T: Clone,
    {
        Self::from_elem_in(n, value, Global)
    }

    /// `n` elements produced by `make`. See [`GrowVec::try_from_fn_in`].
    pub fn try_from_fn<E, F>(n: usize, make: F) -> Result<Self, VecError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::try_from_fn_in(n, Global, make)
    }
}

impl<T, A: Allocator> GrowVec<T, A> {
    /// An empty container drawing storage from `alloc`. Allocates nothing.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            block: RawBlock::empty_in(alloc),
            len: 0,
            metrics: GrowthMetrics {
                block_allocations: 0,
                relocated_elements: 0,
                failed_allocations: 0,
                rollbacks: 0,
            },
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots in the current block. Always `0` or a power of two.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// `true` when there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The allocator backing this container.
    pub fn allocator(&self) -> &A {
        self.block.allocator()
    }

    /// Storage counters accumulated by this container.
    pub fn metrics(&self) -> &GrowthMetrics {
        &self.metrics
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` are initialized; the pointer is aligned and
        // non-null even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.block.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as `as_slice`, and `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.block.as_ptr(), self.len) }
    }

    /// Pointer to the first slot.
    pub fn as_ptr(&self) -> *const T {
        self.block.as_ptr()
    }

    /// Checked access: the element at `index`, or
    /// [`VecError::OutOfRange`] when `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, VecError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(VecError::OutOfRange { index, len })
    }

    /// Checked mutable access. See [`GrowVec::at`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, VecError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(VecError::OutOfRange { index, len })
    }

    /// Unchecked access for hot paths.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "index {index} out of range for length {}", self.len);
        // SAFETY: the caller guarantees `index < len`, so the slot is live.
        unsafe { &*self.block.slot(index) }
    }

    /// Unchecked mutable access.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "index {index} out of range for length {}", self.len);
        // SAFETY: as `get_unchecked`; `&mut self` guarantees uniqueness.
        unsafe { &mut *self.block.slot(index) }
    }

    /// Remove and return the last element, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the live range, so
        // it is read exactly once.
        Some(unsafe { self.block.slot(self.len).read() })
    }

    /// Drop the elements `[n, len)`. No-op when `n >= len`. Never fails and
    /// never releases storage.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len {
            return;
        }
        let tail = self.len - n;
        // Shrink first: a panicking destructor then leaks instead of
        // double-dropping.
        self.len = n;
        // SAFETY: `[n, n + tail)` were live and are no longer reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.block.slot(n), tail));
        }
    }

    /// Drop every element. Capacity is retained.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchange contents with `other` in O(1). Metrics stay with each value.
    pub fn swap(&mut self, other: &mut Self) {
        self.block.swap(&mut other.block);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Adopt `fresh` after relocating the live elements into its first
    /// `len` slots. The old block is released with no elements in it.
    fn adopt(&mut self, mut fresh: RawBlock<T, A>) {
        debug_assert!(fresh.capacity() >= self.len);
        // SAFETY: distinct allocations; `fresh` has room for `len` values and
        // its first `len` slots are uninitialized. The originals become
        // logically moved-out: the old block is freed without dropping them.
        unsafe {
            ptr::copy_nonoverlapping(self.block.as_ptr(), fresh.as_ptr(), self.len);
        }
        trace!(
            old_capacity = self.block.capacity(),
            new_capacity = fresh.capacity(),
            relocated = self.len,
            "block replaced"
        );
        self.metrics.relocated_elements += self.len as u64;
        self.block.swap(&mut fresh);
    }
}

impl<T, A: Allocator + Clone> GrowVec<T, A> {
    /// `n` elements built in slot order by `make`, in a block of
    /// `capacity_for(n)` slots. Any failure drops the built prefix and
    /// releases the block.
    fn build_in<E, F>(n: usize, alloc: A, op: &'static str, make: F) -> Result<Self, VecError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        let mut metrics = GrowthMetrics::default();
        let block = acquire(n, alloc, &mut metrics)?;
        let mut guard = FillGuard::new(&block, 0, op, &mut metrics);
        guard.fill(n, make)?;
        let len = guard.disarm();
        Ok(Self {
            block,
            len,
            metrics,
        })
    }

    /// `n` default-constructed elements in a block of `capacity_for(n)`
    /// slots.
    ///
    /// If `T::default` panics, the elements already built are dropped and
    /// the block is released before the panic continues.
    pub fn with_len_in(n: usize, alloc: A) -> Result<Self, VecError>
    where
        T: Default,
    {
        Self::build_in(n, alloc, "with_len", |_| Ok::<_, Infallible>(T::default()))
    }

    /// `n` clones of `value`, with the same rollback as
    /// [`GrowVec::with_len_in`].
    pub fn from_elem_in(n: usize, value: &T, alloc: A) -> Result<Self, VecError>
    where
        T: Clone,
    {
        Self::build_in(n, alloc, "from_elem", |_| Ok::<_, Infallible>(value.clone()))
    }

    /// `n` elements produced by `make(index)`.
    ///
    /// If `make` returns `Err` at index `i`, elements `[0, i)` are dropped,
    /// the block is released, and the error comes back as
    /// [`VecError::ConstructionFailure`].
    pub fn try_from_fn_in<E, F>(n: usize, alloc: A, make: F) -> Result<Self, VecError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        Self::build_in(n, alloc, "try_from_fn", make)
    }

    /// Element-wise copy into a block of `capacity_for(len())` slots.
    pub fn try_clone(&self) -> Result<Self, VecError>
    where
        T: Clone,
    {
        let src = self.as_slice();
        Self::build_in(self.len, self.allocator().clone(), "clone", |i| {
            Ok::<_, Infallible>(src[i].clone())
        })
    }

    /// Copy-assign: make `self` an element-wise copy of `other`.
    ///
    /// The copy is built completely on the side and swapped in only once it
    /// exists; on failure `self` is untouched.
    pub fn assign_from(&mut self, other: &Self) -> Result<(), VecError>
    where
        T: Clone,
    {
        let mut copy = other.try_clone()?;
        self.swap(&mut copy);
        self.metrics.merge(&copy.metrics);
        Ok(())
    }

    /// Move-construct: transfer this container's storage and elements into
    /// a new value. `self` is left empty with no storage.
    pub fn take(&mut self) -> Self {
        let block = self.block.take();
        let len = mem::replace(&mut self.len, 0);
        Self {
            block,
            len,
            metrics: GrowthMetrics::default(),
        }
    }

    /// Give up the block with its live elements, leaving `self` empty.
    /// The caller becomes responsible for `[0, len)` of the returned block.
    pub(crate) fn release_block(&mut self) -> RawBlock<T, A> {
        self.len = 0;
        self.block.take()
    }

    /// Move-assign: drop this container's elements, then adopt `other`'s
    /// storage and elements. `other` is left empty with no storage.
    pub fn move_from(&mut self, other: &mut Self) {
        self.clear();
        self.block = other.block.take();
        self.len = mem::replace(&mut other.len, 0);
    }

    /// Ensure room for at least `n` elements.
    ///
    /// No-op when `capacity() >= capacity_for(n)`. Otherwise the elements
    /// are relocated into a block of `capacity_for(n)` slots. Relocation is
    /// a bitwise move and cannot fail; only the allocation can.
    pub fn reserve(&mut self, n: usize) -> Result<(), VecError> {
        self.grow_to(n)?;
        Ok(())
    }

    fn grow_to(&mut self, n: usize) -> Result<(), AllocError> {
        if capacity_for(n).is_some_and(|target| self.capacity() >= target) {
            return Ok(());
        }
        let fresh = acquire(n, self.allocator().clone(), &mut self.metrics)?;
        self.adopt(fresh);
        Ok(())
    }

    /// Capacity after one doubling step: `max(1, 2 * len)`.
    fn doubled(&self) -> Result<usize, AllocError> {
        match self.len {
            0 => Ok(1),
            len => len
                .checked_mul(2)
                .ok_or(AllocError::CapacityOverflow { requested: len }),
        }
    }

    /// Construct `[len, new_len)` and commit it in one step.
    ///
    /// When the tail does not fit, a block of `capacity_for(room)` slots is
    /// acquired and the tail is built there first; the live elements move
    /// across only after every new element exists. On failure the partial
    /// tail is dropped, any new block is released, and `self` is unchanged.
    fn extend_tail<E, F>(
        &mut self,
        new_len: usize,
        room: usize,
        op: &'static str,
        make: F,
    ) -> Result<(), VecError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        debug_assert!(new_len >= self.len && room >= new_len);
        if new_len <= self.capacity() {
            let mut guard = FillGuard::new(&self.block, self.len, op, &mut self.metrics);
            guard.fill(new_len, make)?;
            self.len = guard.disarm();
            return Ok(());
        }
        let fresh = acquire(room, self.allocator().clone(), &mut self.metrics)?;
        let mut guard = FillGuard::new(&fresh, self.len, op, &mut self.metrics);
        guard.fill(new_len, make)?;
        let end = guard.disarm();
        self.adopt(fresh);
        self.len = end;
        Ok(())
    }

    fn resize_by<E, F>(&mut self, n: usize, op: &'static str, make: F) -> Result<(), VecError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        if n <= self.len {
            self.truncate(n);
            return Ok(());
        }
        self.extend_tail(n, n, op, make)
    }

    /// Resize to `n`, filling new slots with clones of `value`.
    ///
    /// Shrinking drops `[n, len)` and cannot fail. Growing either succeeds
    /// completely or leaves elements, length and capacity as they were.
    pub fn resize(&mut self, n: usize, value: &T) -> Result<(), VecError>
    where
        T: Clone,
    {
        self.resize_by(n, "resize", |_| Ok::<_, Infallible>(value.clone()))
    }

    /// Resize to `n`, filling new slots with `T::default()`. Same guarantees
    /// as [`GrowVec::resize`].
    pub fn resize_default(&mut self, n: usize) -> Result<(), VecError>
    where
        T: Default,
    {
        self.resize_by(n, "resize_default", |_| Ok::<_, Infallible>(T::default()))
    }

    /// Resize to `n`, filling new slots from a fallible producer. A producer
    /// error rolls the whole call back and is returned as
    /// [`VecError::ConstructionFailure`].
    pub fn try_resize_with<E, F>(&mut self, n: usize, mut make: F) -> Result<(), VecError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.resize_by(n, "try_resize_with", |_| make())
    }

    /// Copy-append a clone of `value`.
    ///
    /// When full, the clone is built into a replacement block of
    /// `max(1, 2 * len)` slots before anything else moves, so a panicking
    /// clone or a refused allocation leaves `self` unmodified.
    pub fn push_clone(&mut self, value: &T) -> Result<(), VecError>
    where
        T: Clone,
    {
        let room = if self.len == self.capacity() {
            self.doubled()?
        } else {
            self.capacity()
        };
        self.extend_tail(self.len + 1, room, "push_clone", |_| {
            Ok::<_, Infallible>(value.clone())
        })
    }

    /// Move-append `value`, doubling capacity when full.
    ///
    /// Only storage acquisition can fail; the value then comes back in the
    /// [`PushError`] and `self` is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), PushError<T>> {
        if self.len == self.capacity() {
            if let Err(err) = self.doubled().and_then(|room| self.grow_to(room)) {
                return Err(PushError::new(value, err));
            }
        }
        // SAFETY: `len < capacity` after the growth above, and slot `len`
        // is uninitialized.
        unsafe { self.block.slot(self.len).write(value) };
        self.len += 1;
        Ok(())
    }
}

impl<T, A: Allocator> Drop for GrowVec<T, A> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` are live; the block frees memory afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}
