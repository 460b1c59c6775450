//! The storage-acquisition seam.
//!
//! Every [`RawBlock`](crate::RawBlock) gets its memory from an [`Allocator`].
//! Containers are generic over the allocator so tests can swap in one that
//! fails on demand and exercise the rollback paths.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// A source of raw memory.
///
/// # Safety
///
/// Implementors must uphold:
///
/// - A successful [`allocate`](Allocator::allocate) returns a pointer valid
///   for reads and writes of `layout.size()` bytes and aligned to
///   `layout.align()`, until it is passed to `deallocate`.
/// - Clones of an allocator are interchangeable: memory obtained from one
///   clone may be released through any other.
/// - Zero-sized requests must succeed with a well-aligned dangling pointer,
///   and `deallocate` must accept that pointer back as a no-op.
pub unsafe trait Allocator {
    /// Acquire storage for `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Release storage previously returned by `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator (or a clone of it)
    /// with exactly this `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide general-purpose allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

/// Well-aligned, non-null, never-dereferenced pointer for zero-sized requests.
fn dangling_for(layout: Layout) -> NonNull<u8> {
    // `align` is never zero, so this never falls back.
    NonNull::new(ptr::without_provenance_mut(layout.align())).unwrap_or(NonNull::dangling())
}

// SAFETY: forwards to `std::alloc`, which satisfies the contract for
// non-zero sizes; zero-sized requests never reach it.
unsafe impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling_for(layout));
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        NonNull::new(raw).ok_or(AllocError::Exhausted { layout })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: the caller guarantees `ptr` came from `allocate` with this
        // layout, and non-zero layouts were served by `std::alloc::alloc`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_roundtrip() {
        let layout = Layout::array::<u32>(16).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
        unsafe {
            ptr.as_ptr().cast::<u32>().write(7);
            assert_eq!(ptr.as_ptr().cast::<u32>().read(), 7);
            Global.deallocate(ptr, layout);
        }
    }

    #[test]
    fn zero_sized_request_is_aligned_and_free() {
        let layout = Layout::from_size_align(0, 16).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 16, 0);
        unsafe { Global.deallocate(ptr, layout) };
    }
}
