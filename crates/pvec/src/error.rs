//! Error types for container operations.

use std::alloc::handle_alloc_error;
use std::convert::Infallible;
use std::error::Error;
use std::fmt;

use pvec_raw::AllocError;

/// Errors from [`GrowVec`](crate::GrowVec) operations.
///
/// `E` is the error type of a caller-supplied element constructor
/// (`try_from_fn`, `try_resize_with`). Operations that construct elements
/// with `Default` or `Clone` use the default `E = Infallible`: those
/// constructors can only fail by panicking, which unwinds through the same
/// rollback path.
///
/// Whatever the variant, the receiver is left exactly as it was before the
/// call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VecError<E = Infallible> {
    /// Storage could not be acquired. Any elements built during the call
    /// were dropped and any new block released.
    AllocationFailure(AllocError),
    /// Checked access past the live range.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
    /// An element constructor reported failure.
    ConstructionFailure {
        /// Slot index whose construction failed.
        index: usize,
        /// The constructor's error.
        source: E,
    },
}

impl<E> From<AllocError> for VecError<E> {
    fn from(err: AllocError) -> Self {
        Self::AllocationFailure(err)
    }
}

impl<E: fmt::Display> fmt::Display for VecError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure(err) => write!(f, "{err}"),
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::ConstructionFailure { index, source } => {
                write!(f, "constructing element {index} failed: {source}")
            }
        }
    }
}

impl<E: Error + 'static> Error for VecError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AllocationFailure(err) => Some(err),
            Self::OutOfRange { .. } => None,
            Self::ConstructionFailure { source, .. } => Some(source),
        }
    }
}

impl VecError<Infallible> {
    /// Turn the error into a panic (or an allocation-failure abort) for
    /// trait methods that have no way to return it.
    pub(crate) fn escalate(self) -> ! {
        match self {
            Self::AllocationFailure(err) => alloc_failure(err),
            Self::OutOfRange { index, len } => {
                panic!("index {index} out of range for length {len}")
            }
            Self::ConstructionFailure { source, .. } => match source {},
        }
    }
}

/// A move-append that could not acquire storage.
///
/// Carries the rejected value back to the caller.
pub struct PushError<T> {
    value: T,
    error: AllocError,
}

impl<T> PushError<T> {
    pub(crate) fn new(value: T, error: AllocError) -> Self {
        Self { value, error }
    }

    /// The allocation failure.
    pub fn error(&self) -> &AllocError {
        &self.error
    }

    /// Recover the value that was not pushed.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "push failed: {}", self.error)
    }
}

impl<T> Error for PushError<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Divert an allocation failure in an infallible trait method (`Clone`,
/// `FromIterator`, `Extend`) the way the standard collections do.
pub(crate) fn alloc_failure(err: AllocError) -> ! {
    match err {
        AllocError::Exhausted { layout } => handle_alloc_error(layout),
        AllocError::CapacityOverflow { requested } => {
            panic!("capacity overflow: {requested} slots requested")
        }
    }
}
