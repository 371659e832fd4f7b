//! Heap error types.

use std::error::Error;
use std::fmt;

use crate::handle::Address;

/// Errors returned by [`Heap`](crate::Heap) operations.
///
/// Every failing call leaves the heap exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// The arena reservation could not be made.
    OutOfMemory {
        /// Number of bytes requested for the arena.
        requested: usize,
    },
    /// The handle already owns an arena; destroy it before re-initializing.
    AlreadyInitialized {
        /// Capacity of the arena currently held.
        capacity: usize,
    },
    /// The handle holds no arena (never initialized, or destroyed).
    NotInitialized,
    /// No free block can satisfy the request.
    NoSuitableBlock {
        /// Number of bytes requested by the caller.
        requested: usize,
    },
    /// A malformed argument: zero size, out-of-bounds range, or a span that
    /// would overlap a free block.
    InvalidArgument {
        /// What was wrong with the call.
        reason: String,
    },
    /// The address is not the start of a live allocation.
    UnknownAllocation {
        /// The address passed by the caller.
        address: Address,
    },
    /// The size passed to `free` differs from the size passed to `allocate`.
    SizeMismatch {
        /// The allocation being released.
        address: Address,
        /// Size recorded when the block was allocated.
        recorded: usize,
        /// Size supplied to `free`.
        supplied: usize,
    },
    /// The free list is empty.
    Empty,
}

impl HeapError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: could not reserve {requested} bytes")
            }
            Self::AlreadyInitialized { capacity } => {
                write!(f, "heap already initialized with {capacity} bytes")
            }
            Self::NotInitialized => write!(f, "heap not initialized"),
            Self::NoSuitableBlock { requested } => {
                write!(f, "no free block can hold {requested} bytes")
            }
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::UnknownAllocation { address } => {
                write!(f, "no live allocation at {address}")
            }
            Self::SizeMismatch {
                address,
                recorded,
                supplied,
            } => {
                write!(
                    f,
                    "size mismatch at {address}: allocated {recorded} bytes, freeing {supplied}"
                )
            }
            Self::Empty => write!(f, "free list is empty"),
        }
    }
}

impl Error for HeapError {}
