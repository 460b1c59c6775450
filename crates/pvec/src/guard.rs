//! Rollback guard for elements built into raw slots.
//!
//! [`FillGuard`] owns the half-open slot range `[start, end)` that the
//! current operation has constructed so far. If the operation bails out,
//! by returning an error or by a constructor panicking, the guard drops
//! exactly that range on its way out. Committing the work means calling
//! [`FillGuard::disarm`] and taking over the range in the container's
//! length.

#![allow(unsafe_code)]

use std::mem;
use std::ptr;

use pvec_raw::{Allocator, RawBlock};
use tracing::debug;

use crate::error::VecError;
use crate::metrics::GrowthMetrics;

pub(crate) struct FillGuard<'a, T, A: Allocator> {
    block: &'a RawBlock<T, A>,
    start: usize,
    end: usize,
    op: &'static str,
    metrics: &'a mut GrowthMetrics,
}

impl<'a, T, A: Allocator> FillGuard<'a, T, A> {
    /// Start tracking at `start`. Slots from `start` on must be uninitialized.
    pub(crate) fn new(
        block: &'a RawBlock<T, A>,
        start: usize,
        op: &'static str,
        metrics: &'a mut GrowthMetrics,
    ) -> Self {
        Self {
            block,
            start,
            end: start,
            op,
            metrics,
        }
    }

    /// Construct slots up to `target` (exclusive) in order.
    ///
    /// `make` receives the slot index. On `Err` the slots built so far stay
    /// owned by the guard and are dropped with it.
    pub(crate) fn fill<E, F>(&mut self, target: usize, mut make: F) -> Result<(), VecError<E>>
    where
        F: FnMut(usize) -> Result<T, E>,
    {
        debug_assert!(target <= self.block.capacity());
        while self.end < target {
            let value = make(self.end).map_err(|source| VecError::ConstructionFailure {
                index: self.end,
                source,
            })?;
            // SAFETY: `end < target <= capacity` and the slot is uninitialized.
            unsafe { self.block.slot(self.end).write(value) };
            self.end += 1;
        }
        Ok(())
    }

    /// Hand the constructed range to the caller. Returns the end index.
    pub(crate) fn disarm(self) -> usize {
        let end = self.end;
        mem::forget(self);
        end
    }
}

impl<T, A: Allocator> Drop for FillGuard<'_, T, A> {
    fn drop(&mut self) {
        self.metrics.rollbacks += 1;
        let built = self.end - self.start;
        debug!(op = self.op, start = self.start, built, "rolling back partially built elements");
        // SAFETY: `[start, end)` was written by `fill` and nobody else owns it.
        unsafe {
            let first = self.block.slot(self.start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, built));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    struct Counted(Rc<Cell<usize>>);

    impl Drop for Counted {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn error_drops_built_prefix() {
        let drops = Rc::new(Cell::new(0));
        let block = RawBlock::<Counted>::new(8).unwrap();
        let mut metrics = GrowthMetrics::default();
        {
            let mut guard = FillGuard::new(&block, 0, "test", &mut metrics);
            let result = guard.fill(6, |i| {
                if i == 4 {
                    Err("boom")
                } else {
                    Ok(Counted(drops.clone()))
                }
            });
            assert_eq!(
                result.err(),
                Some(VecError::ConstructionFailure {
                    index: 4,
                    source: "boom"
                })
            );
        }
        assert_eq!(drops.get(), 4);
        assert_eq!(metrics.rollbacks, 1);
    }

    #[test]
    fn disarm_keeps_values_alive() {
        let drops = Rc::new(Cell::new(0));
        let block = RawBlock::<Counted>::new(4).unwrap();
        let mut metrics = GrowthMetrics::default();
        let mut guard = FillGuard::new(&block, 1, "test", &mut metrics);
        guard
            .fill(3, |_| Ok::<_, Infallible>(Counted(drops.clone())))
            .unwrap();
        assert_eq!(guard.disarm(), 3);
        assert_eq!(drops.get(), 0);
        assert_eq!(metrics.rollbacks, 0);
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(block.slot(1), 2));
        }
        assert_eq!(drops.get(), 2);
    }
}
