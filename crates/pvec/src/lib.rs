//! A growable contiguous container with power-of-two capacity and strong
//! failure guarantees.
//!
//! [`GrowVec`] separates allocation from construction: storage comes from a
//! [`RawBlock`] of uninitialized slots, and the container alone tracks
//! which prefix of those slots holds live values.
//!
//! # Architecture
//!
//! ```text
//! GrowVec<T, A>
//! ├── RawBlock<T, A>    (pvec-raw: slots, capacity 0 or 2^k, release)
//! │   └── A: Allocator  (Global by default, pluggable)
//! ├── len               (slots [0, len) are live)
//! └── GrowthMetrics     (allocation / relocation / rollback counters)
//! ```
//!
//! # Failure model
//!
//! Every mutating operation is all-or-nothing. Elements are built under a
//! rollback guard, and operations that need a bigger block build it (new
//! tail elements included) before the receiver is touched. That covers all
//! three ways an operation can fail:
//!
//! - the allocator refuses ([`VecError::AllocationFailure`]),
//! - a fallible element constructor returns `Err`
//!   ([`VecError::ConstructionFailure`]),
//! - `Default::default` or `Clone::clone` panics (unwinds with the
//!   container unchanged).
//!
//! Relocating elements between blocks is a bitwise move and cannot fail.
//! Element destructors must not panic.
//!
//! # Growth
//!
//! Capacities are always produced by [`capacity_for`], so they are `0` or a
//! power of two, and `n` single appends reallocate `O(log n)` times.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
mod guard;
mod impls;
pub mod into_iter;
pub mod metrics;
pub mod vec;

pub use error::{PushError, VecError};
pub use into_iter::IntoIter;
pub use metrics::GrowthMetrics;
pub use vec::GrowVec;

pub use pvec_raw::{capacity_for, AllocError, Allocator, Global, RawBlock};
