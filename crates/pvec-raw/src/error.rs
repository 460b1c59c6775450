//! Allocation error type.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Errors raised while acquiring storage for a [`RawBlock`](crate::RawBlock).
///
/// Neither variant leaves partial state behind: a failed request allocates
/// nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator could not satisfy a well-formed request.
    Exhausted {
        /// The layout that was requested.
        layout: Layout,
    },
    /// The requested slot count cannot be rounded up to a power of two, or
    /// its byte size does not fit in `isize::MAX`.
    CapacityOverflow {
        /// Number of slots that was requested.
        requested: usize,
    },
}

impl AllocError {
    /// Number of bytes the failed request asked for, when known.
    pub fn requested_bytes(&self) -> Option<usize> {
        match self {
            Self::Exhausted { layout } => Some(layout.size()),
            Self::CapacityOverflow { .. } => None,
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { layout } => {
                write!(
                    f,
                    "allocation failed: {} bytes (align {})",
                    layout.size(),
                    layout.align()
                )
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} slots requested")
            }
        }
    }
}

impl Error for AllocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_size() {
        let layout = Layout::array::<u64>(4).unwrap();
        let err = AllocError::Exhausted { layout };
        assert_eq!(err.to_string(), "allocation failed: 32 bytes (align 8)");
        assert_eq!(err.requested_bytes(), Some(32));
    }

    #[test]
    fn overflow_has_no_byte_count() {
        let err = AllocError::CapacityOverflow {
            requested: usize::MAX,
        };
        assert!(err.to_string().starts_with("capacity overflow"));
        assert_eq!(err.requested_bytes(), None);
    }
}
