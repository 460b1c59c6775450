//! Fault-injection configuration.

/// Which storage requests a [`FailingAllocator`](crate::FailingAllocator)
/// refuses.
///
/// Requests are numbered from 1 in the order the allocator sees them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultConfig {
    /// Refuse exactly this request, if set.
    pub fail_on_request: Option<u64>,

    /// Refuse any request that would push outstanding bytes above this.
    ///
    /// Default: `usize::MAX` (no limit).
    pub byte_budget: usize,
}

impl FaultConfig {
    /// Default byte budget: unlimited.
    pub const DEFAULT_BYTE_BUDGET: usize = usize::MAX;

    /// A configuration that never refuses.
    pub fn new() -> Self {
        Self {
            fail_on_request: None,
            byte_budget: Self::DEFAULT_BYTE_BUDGET,
        }
    }

    /// Refuse the `n`-th request (1-based).
    pub fn fail_on_request(mut self, n: u64) -> Self {
        self.fail_on_request = Some(n);
        self
    }

    /// Cap outstanding bytes at `bytes`.
    pub fn byte_budget(mut self, bytes: usize) -> Self {
        self.byte_budget = bytes;
        self
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self::new()
    }
}
