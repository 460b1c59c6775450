//! By-value iteration.

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use pvec_raw::{Allocator, Global, RawBlock};

/// Owning iterator returned by `GrowVec::into_iter`.
///
/// Holds the container's block; slots `[start, end)` are the elements not
/// yet yielded. Dropping the iterator drops those and releases the block.
pub struct IntoIter<T, A: Allocator = Global> {
    block: RawBlock<T, A>,
    start: usize,
    end: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn new(block: RawBlock<T, A>, len: usize) -> Self {
        Self {
            block,
            start: 0,
            end: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` are live and owned by the iterator.
        unsafe { slice::from_raw_parts(self.block.slot(self.start), self.end - self.start) }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: slot `start` is live; advancing `start` hands it out once.
        let value = unsafe { self.block.slot(self.start).read() };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: slot `end` was live and is now outside the remaining range.
        Some(unsafe { self.block.slot(self.end).read() })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        // SAFETY: `[start, end)` were never yielded.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.block.slot(self.start),
                remaining,
            ));
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::GrowVec;
    use std::rc::Rc;

    #[test]
    fn yields_in_order_from_both_ends() {
        let v = GrowVec::try_from_fn(5, |i| Ok::<_, ()>(i)).unwrap();
        let mut it = v.into_iter();
        assert_eq!(it.len(), 5);
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next_back(), Some(4));
        assert_eq!(it.as_slice(), &[1, 2, 3]);
        assert_eq!(it.collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn drop_releases_unyielded_elements() {
        let shared = Rc::new(());
        let v = GrowVec::from_elem(4, &shared).unwrap();
        assert_eq!(Rc::strong_count(&shared), 5);
        let mut it = v.into_iter();
        let first = it.next();
        drop(it);
        assert_eq!(Rc::strong_count(&shared), 2);
        drop(first);
        assert_eq!(Rc::strong_count(&shared), 1);
    }
}
