//! Instrumented element type for leak, double-drop and rollback checks.
//!
//! [`Tracked`] values report construction and destruction to per-thread
//! counters read through a [`Probe`]. The probe can also arm a fuse so that
//! the n-th construction after arming fails: by panicking for `Clone` and
//! `Default`, or by returning [`InjectedFailure`] from
//! [`Probe::try_make`]. Each test runs on its own thread, so counters do not
//! leak between tests; [`Probe::new`] resets them anyway.

use std::cell::Cell;
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;

thread_local! {
    static LIVE: Cell<i64> = const { Cell::new(0) };
    static CONSTRUCTED: Cell<u64> = const { Cell::new(0) };
    static DROPPED: Cell<u64> = const { Cell::new(0) };
    static FUSE: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Error returned by [`Probe::try_make`] when the fuse blows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectedFailure {
    /// Id of the value that was being built.
    pub id: u32,
}

impl fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "injected construction failure for id {}", self.id)
    }
}

impl Error for InjectedFailure {}

/// Burn one unit of the fuse. `false` means this construction must fail.
fn consume_fuse() -> bool {
    FUSE.with(|fuse| match fuse.get() {
        None => true,
        Some(0) => {
            fuse.set(None);
            false
        }
        Some(n) => {
            fuse.set(Some(n - 1));
            true
        }
    })
}

fn record_construction() {
    LIVE.with(|c| c.set(c.get() + 1));
    CONSTRUCTED.with(|c| c.set(c.get() + 1));
}

/// Observer for the current thread's [`Tracked`] counters.
pub struct Probe {
    _thread_bound: PhantomData<*const ()>,
}

impl Probe {
    /// Reset all counters and disarm the fuse.
    pub fn new() -> Self {
        LIVE.with(|c| c.set(0));
        CONSTRUCTED.with(|c| c.set(0));
        DROPPED.with(|c| c.set(0));
        FUSE.with(|c| c.set(None));
        Self {
            _thread_bound: PhantomData,
        }
    }

    /// Values constructed and not yet dropped.
    pub fn live(&self) -> i64 {
        LIVE.with(Cell::get)
    }

    /// Total constructions (including clones and defaults).
    pub fn constructed(&self) -> u64 {
        CONSTRUCTED.with(Cell::get)
    }

    /// Total drops.
    pub fn dropped(&self) -> u64 {
        DROPPED.with(Cell::get)
    }

    /// Let `n` more fuse-checked constructions succeed, then fail the next.
    pub fn fail_after(&self, n: u64) {
        FUSE.with(|c| c.set(Some(n)));
    }

    /// Stop injecting failures.
    pub fn disarm(&self) {
        FUSE.with(|c| c.set(None));
    }

    /// Fallible constructor honouring the fuse.
    pub fn try_make(&self, id: u32) -> Result<Tracked, InjectedFailure> {
        if !consume_fuse() {
            return Err(InjectedFailure { id });
        }
        Ok(Tracked::new(id))
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

/// An element that counts its own lifecycle.
///
/// `Tracked::new` always succeeds; `Clone` and `Default` panic when the
/// probe's fuse blows.
#[derive(Debug, PartialEq, Eq)]
pub struct Tracked {
    id: u32,
}

impl Tracked {
    pub fn new(id: u32) -> Self {
        record_construction();
        Self { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        assert!(consume_fuse(), "injected clone failure for id {}", self.id);
        Self::new(self.id)
    }
}

impl Default for Tracked {
    fn default() -> Self {
        assert!(consume_fuse(), "injected default failure");
        Self::new(0)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE.with(|c| c.set(c.get() - 1));
        DROPPED.with(|c| c.set(c.get() + 1));
    }
}
