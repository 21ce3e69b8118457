use std::error::Error;
use std::fmt;

/// An error with allocating or deallocating memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// No free memory region is large enough for the request.
    OutOfMemory,
    /// The request is larger than anything the allocator can ever serve.
    RequestTooLarge,
    /// The requested alignment is stricter than the allocator supports.
    UnsupportedAlignment,
    /// The requested element count does not fit in a `Layout`.
    CapacityOverflow,
    /// The pointer does not belong to the allocator.
    PointerOutsideRange,
    /// The pointer does not point to the start of an allocation.
    PointerNotAligned,
    /// The layout does not match the one the memory was allocated with.
    LayoutMismatch,
    /// The block was not in use.
    BlockAlreadyFree,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::OutOfMemory => "out of memory",
            Self::RequestTooLarge => "requested size exceeds the maximum allocation size",
            Self::UnsupportedAlignment => "requested alignment is not supported",
            Self::CapacityOverflow => "capacity overflow",
            Self::PointerOutsideRange => "pointer is outside the allocator's range",
            Self::PointerNotAligned => "pointer does not point to the start of an allocation",
            Self::LayoutMismatch => "layout does not match the allocation",
            Self::BlockAlreadyFree => "block is already free",
        };
        f.write_str(msg)
    }
}

impl Error for AllocError {}

/// Errors reported by the checked operations of [`DynamicArray`](crate::DynamicArray).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// An index was not below the array's length.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The length of the array at the time of the access.
        len: usize,
    },
    /// An element-wise operation was given arrays of different lengths.
    SizeMismatch {
        /// Length of the left operand.
        left: usize,
        /// Length of the right operand.
        right: usize,
    },
    /// The allocator could not provide storage for the result.
    Alloc(AllocError),
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index out of range: the len is {len} but the index is {index}")
            }
            Self::SizeMismatch { left, right } => {
                write!(f, "size mismatch: left operand has {left} elements, right has {right}")
            }
            Self::Alloc(err) => write!(f, "allocation failed: {err}"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocError> for ArrayError {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}

/// An invalid [`ArenaConfig`](crate::ArenaConfig).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The block size is not a power of two.
    BlockSizeNotPowerOfTwo(usize),
    /// The block size is smaller than the minimum block size.
    BlockSizeTooSmall {
        /// The configured block size.
        block_size: usize,
        /// The smallest accepted block size.
        min: usize,
    },
    /// The arena would have no blocks.
    NoBlocks,
    /// The region would exceed `isize::MAX` bytes.
    RegionTooLarge,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockSizeNotPowerOfTwo(size) => {
                write!(f, "block size {size} is not a power of two")
            }
            Self::BlockSizeTooSmall { block_size, min } => {
                write!(f, "block size {block_size} is smaller than the minimum of {min}")
            }
            Self::NoBlocks => f.write_str("arena must have at least one block"),
            Self::RegionTooLarge => f.write_str("arena region exceeds isize::MAX bytes"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_index_and_len() {
        let err = ArrayError::OutOfRange { index: 6, len: 6 };
        assert_eq!(
            err.to_string(),
            "index out of range: the len is 6 but the index is 6"
        );
    }

    #[test]
    fn alloc_error_is_the_source() {
        let err = ArrayError::from(AllocError::OutOfMemory);
        assert_eq!(err, ArrayError::Alloc(AllocError::OutOfMemory));
        assert!(err.source().is_some());
        assert!(ArrayError::SizeMismatch { left: 1, right: 2 }.source().is_none());
    }
}
