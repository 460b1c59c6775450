//! Test utilities for pvec development.
//!
//! Provides a fault-injecting [`FailingAllocator`] (configured through
//! [`FaultConfig`]) and instrumented element types ([`Tracked`], observed
//! through a [`Probe`]) for exercising rollback paths and checking that no
//! value is leaked or dropped twice.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod alloc;
pub mod config;
pub mod probe;

pub use alloc::FailingAllocator;
pub use config::FaultConfig;
pub use probe::{InjectedFailure, Probe, Tracked};
