//! Storage error types.

use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Errors that can occur while obtaining storage for a [`DynArray`](crate::DynArray).
///
/// Every fallible operation that returns this error leaves the container
/// exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// The requested element count cannot be represented as an allocation.
    ///
    /// Either the byte size exceeds `isize::MAX` or computing the grown
    /// capacity overflowed `usize`.
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
    },
    /// The global allocator could not satisfy the request.
    AllocFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
        /// Alignment of the failed request in bytes.
        align: usize,
    },
}

impl StorageError {
    pub(crate) fn alloc_failed(layout: Layout) -> Self {
        Self::AllocFailed {
            bytes: layout.size(),
            align: layout.align(),
        }
    }

    /// Escalate an error from an infallible entry point.
    ///
    /// Overflow panics; allocator failure goes through
    /// [`handle_alloc_error`](std::alloc::handle_alloc_error).
    #[cold]
    pub(crate) fn escalate(self) -> ! {
        match self {
            Self::CapacityOverflow { .. } => panic!("capacity overflow"),
            Self::AllocFailed { bytes, align } => match Layout::from_size_align(bytes, align) {
                Ok(layout) => std::alloc::handle_alloc_error(layout),
                Err(_) => panic!("allocation of {bytes} bytes failed"),
            },
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} elements requested")
            }
            Self::AllocFailed { bytes, align } => {
                write!(
                    f,
                    "allocation failed: {bytes} bytes with alignment {align}"
                )
            }
        }
    }
}

impl Error for StorageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_request() {
        let err = StorageError::CapacityOverflow { requested: 7 };
        assert_eq!(err.to_string(), "capacity overflow: 7 elements requested");

        let err = StorageError::AllocFailed { bytes: 64, align: 8 };
        assert_eq!(
            err.to_string(),
            "allocation failed: 64 bytes with alignment 8"
        );
    }

    #[test]
    fn alloc_failed_records_layout() {
        let layout = Layout::array::<u64>(4).unwrap();
        assert_eq!(
            StorageError::alloc_failed(layout),
            StorageError::AllocFailed { bytes: 32, align: 8 }
        );
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn overflow_escalates_to_panic() {
        StorageError::CapacityOverflow { requested: usize::MAX }.escalate();
    }
}
