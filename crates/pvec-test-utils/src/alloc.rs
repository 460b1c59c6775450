//! An allocator that refuses on command and audits what it hands out.

use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use pvec_raw::{AllocError, Allocator, Global};

use crate::config::FaultConfig;

struct FaultState {
    fail_on_request: Cell<Option<u64>>,
    byte_budget: Cell<usize>,
    requests: Cell<u64>,
    refusals: Cell<u64>,
    live_bytes: Cell<usize>,
    live_blocks: Cell<usize>,
}

/// Allocator wrapper around [`Global`] with failure injection.
///
/// Clones share one set of counters, so a container and every block it
/// creates report into the same place. Not `Send`: the counters are plain
/// `Cell`s.
#[derive(Clone)]
pub struct FailingAllocator {
    state: Rc<FaultState>,
}

impl FailingAllocator {
    pub fn new(config: FaultConfig) -> Self {
        Self {
            state: Rc::new(FaultState {
                fail_on_request: Cell::new(config.fail_on_request),
                byte_budget: Cell::new(config.byte_budget),
                requests: Cell::new(0),
                refusals: Cell::new(0),
                live_bytes: Cell::new(0),
                live_blocks: Cell::new(0),
            }),
        }
    }

    /// An allocator that refuses nothing until told to.
    pub fn unlimited() -> Self {
        Self::new(FaultConfig::default())
    }

    /// Refuse the very next request.
    pub fn fail_next(&self) {
        self.state
            .fail_on_request
            .set(Some(self.state.requests.get() + 1));
    }

    /// Stop refusing by request number.
    pub fn disarm(&self) {
        self.state.fail_on_request.set(None);
    }

    /// Replace the outstanding-bytes cap.
    pub fn set_byte_budget(&self, bytes: usize) {
        self.state.byte_budget.set(bytes);
    }

    /// Requests seen so far, refused ones included.
    pub fn requests(&self) -> u64 {
        self.state.requests.get()
    }

    /// Requests refused so far.
    pub fn refusals(&self) -> u64 {
        self.state.refusals.get()
    }

    /// Bytes handed out and not yet returned.
    pub fn live_bytes(&self) -> usize {
        self.state.live_bytes.get()
    }

    /// Allocations handed out and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.state.live_blocks.get()
    }

    fn should_refuse(&self, request: u64, layout: Layout) -> bool {
        if self.state.fail_on_request.get() == Some(request) {
            return true;
        }
        let budget = self.state.byte_budget.get();
        self.live_bytes()
            .checked_add(layout.size())
            .is_none_or(|total| total > budget)
    }
}

impl fmt::Debug for FailingAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailingAllocator")
            .field("requests", &self.requests())
            .field("refusals", &self.refusals())
            .field("live_bytes", &self.live_bytes())
            .field("live_blocks", &self.live_blocks())
            .finish()
    }
}

// SAFETY: every successful allocation is served by `Global`, and every
// deallocation is forwarded to it with the caller's layout. Clones share
// state and all forward to the same `Global`.
#[allow(unsafe_code)]
unsafe impl Allocator for FailingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let request = self.state.requests.get() + 1;
        self.state.requests.set(request);
        if self.should_refuse(request, layout) {
            self.state.refusals.set(self.state.refusals.get() + 1);
            return Err(AllocError::Exhausted { layout });
        }
        let ptr = Global.allocate(layout)?;
        self.state.live_bytes.set(self.live_bytes() + layout.size());
        self.state.live_blocks.set(self.live_blocks() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.state.live_bytes.set(self.live_bytes() - layout.size());
        self.state.live_blocks.set(self.live_blocks() - 1);
        // SAFETY: forwarded unchanged; the caller upholds the contract and
        // the pointer came from `Global` in `allocate`.
        unsafe { Global.deallocate(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvec_raw::RawBlock;

    #[test]
    fn counts_and_releases() {
        let alloc = FailingAllocator::unlimited();
        {
            let block = RawBlock::<u32, _>::new_in(3, alloc.clone()).unwrap();
            assert_eq!(block.capacity(), 4);
            assert_eq!(alloc.live_bytes(), 16);
            assert_eq!(alloc.live_blocks(), 1);
        }
        assert_eq!(alloc.requests(), 1);
        assert_eq!(alloc.live_bytes(), 0);
        assert_eq!(alloc.live_blocks(), 0);
    }

    #[test]
    fn refuses_configured_request() {
        let alloc = FailingAllocator::new(FaultConfig::new().fail_on_request(2));
        let first = RawBlock::<u8, _>::new_in(1, alloc.clone());
        let second = RawBlock::<u8, _>::new_in(1, alloc.clone());
        let third = RawBlock::<u8, _>::new_in(1, alloc.clone());
        assert!(first.is_ok());
        assert!(matches!(second, Err(AllocError::Exhausted { .. })));
        assert!(third.is_ok());
        assert_eq!(alloc.refusals(), 1);
    }

    #[test]
    fn fail_next_is_relative_to_current_count() {
        let alloc = FailingAllocator::unlimited();
        let _a = RawBlock::<u8, _>::new_in(1, alloc.clone()).unwrap();
        alloc.fail_next();
        assert!(RawBlock::<u8, _>::new_in(1, alloc.clone()).is_err());
        assert!(RawBlock::<u8, _>::new_in(1, alloc.clone()).is_ok());
    }

    #[test]
    fn disarm_cancels_pending_refusal() {
        let alloc = FailingAllocator::unlimited();
        alloc.fail_next();
        alloc.disarm();
        assert!(RawBlock::<u8, _>::new_in(1, alloc.clone()).is_ok());
        assert_eq!(alloc.refusals(), 0);
    }

    #[test]
    fn byte_budget_limits_outstanding_memory() {
        let alloc = FailingAllocator::new(FaultConfig::new().byte_budget(32));
        let a = RawBlock::<u64, _>::new_in(4, alloc.clone()).unwrap();
        assert!(RawBlock::<u64, _>::new_in(1, alloc.clone()).is_err());
        drop(a);
        assert!(RawBlock::<u64, _>::new_in(2, alloc.clone()).is_ok());
    }

    #[test]
    fn empty_blocks_make_no_requests() {
        let alloc = FailingAllocator::unlimited();
        let _ = RawBlock::<u64, _>::new_in(0, alloc.clone()).unwrap();
        assert_eq!(alloc.requests(), 0);
    }
}
