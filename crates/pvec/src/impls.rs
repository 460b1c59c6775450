//! Standard trait implementations for [`GrowVec`].

use std::fmt;
use std::ops::{Deref, DerefMut};

use pvec_raw::{Allocator, Global};

use crate::error::alloc_failure;
use crate::into_iter::IntoIter;
use crate::vec::GrowVec;

impl<T, A: Allocator> Deref for GrowVec<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> DerefMut for GrowVec<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator> AsRef<[T]> for GrowVec<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator + Default> Default for GrowVec<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for GrowVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for GrowVec<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| err.escalate())
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.assign_from(source) {
            err.escalate()
        }
    }
}

impl<T, U, A, B> PartialEq<GrowVec<U, B>> for GrowVec<T, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &GrowVec<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: Allocator> Eq for GrowVec<T, A> {}

impl<T, U, A: Allocator> PartialEq<[U]> for GrowVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: Allocator, const N: usize> PartialEq<[U; N]> for GrowVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T> FromIterator<T> for GrowVec<T, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = GrowVec::new();
        v.extend(iter);
        v
    }
}

impl<T, A: Allocator + Clone> Extend<T> for GrowVec<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Some(want) = self.len().checked_add(lower) {
            if let Err(err) = self.reserve(want) {
                err.escalate()
            }
        }
        for item in iter {
            if let Err(err) = self.push(item) {
                alloc_failure(err.error().clone());
            }
        }
    }
}

impl<T, A: Allocator + Clone> IntoIterator for GrowVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(mut self) -> IntoIter<T, A> {
        let len = self.len();
        let block = self.release_block();
        IntoIter::new(block, len)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a GrowVec<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut GrowVec<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
