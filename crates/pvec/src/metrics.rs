//! Growth and failure counters for a single container.
//!
//! [`GrowthMetrics`] records how often a container acquired storage, how
//! many elements were relocated between blocks, and how many operations
//! rolled back. Counters are cumulative for the lifetime of the container
//! value and are not exchanged by `swap` or moved by `take`.

/// Cumulative storage and rollback counters for one [`GrowVec`](crate::GrowVec).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrowthMetrics {
    /// Blocks this container acquired from its allocator (initial allocation
    /// included). Blocks of zero-sized elements need no memory and are not
    /// counted.
    pub block_allocations: u64,
    /// Elements relocated from a replaced block into its successor.
    pub relocated_elements: u64,
    /// Storage requests the allocator refused.
    pub failed_allocations: u64,
    /// Operations that failed after doing partial work and undid it.
    pub rollbacks: u64,
}

impl GrowthMetrics {
    /// Fold `other`'s counters into `self`.
    pub fn merge(&mut self, other: &GrowthMetrics) {
        self.block_allocations += other.block_allocations;
        self.relocated_elements += other.relocated_elements;
        self.failed_allocations += other.failed_allocations;
        self.rollbacks += other.rollbacks;
    }
}
