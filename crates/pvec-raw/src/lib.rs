//! Raw storage for the `pvec` container.
//!
//! This crate owns memory but never owns values. It provides:
//!
//! - [`Allocator`]: the pluggable storage-acquisition seam, with [`Global`]
//!   forwarding to the process-wide allocator.
//! - [`RawBlock`]: a fixed-capacity run of uninitialized `T` slots obtained
//!   from an allocator. Capacity is always `0` or a power of two.
//! - [`capacity_for`]: the sizing rule every block and every growth step
//!   goes through.
//!
//! # Layering
//!
//! ```text
//! GrowVec<T, A>         (pvec: tracks which slots are live)
//! └── RawBlock<T, A>    (this crate: slots, capacity, release)
//!     └── A: Allocator  (Global, or a fault-injecting test allocator)
//! ```
//!
//! Construction and destruction of elements is entirely the caller's
//! business. A block dropped with live values in it leaks those values.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod alloc;
pub mod block;
pub mod error;

pub use alloc::{Allocator, Global};
pub use block::{capacity_for, RawBlock};
pub use error::AllocError;
