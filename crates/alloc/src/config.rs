use bytesize::ByteSize;

use crate::error::ConfigError;

/// Configuration for an [`Arena`](crate::Arena).
///
/// The arena reserves `block_size * block_count` bytes up front and never grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each block in bytes. Also the strongest alignment the arena can serve.
    ///
    /// Must be a power of two and at least [`MIN_BLOCK_SIZE`](Self::MIN_BLOCK_SIZE).
    pub block_size: usize,
    /// Number of blocks in the region.
    pub block_count: usize,
}

impl ArenaConfig {
    pub const MIN_BLOCK_SIZE: usize = 8;
    pub const DEFAULT_BLOCK_SIZE: usize = 64;
    pub const DEFAULT_BLOCK_COUNT: usize = 1024;

    pub fn new(block_size: usize, block_count: usize) -> Self {
        Self {
            block_size,
            block_count,
        }
    }

    /// Returns the size of the whole region in bytes, if it fits in `usize`.
    pub fn total_bytes(&self) -> Option<usize> {
        self.block_size.checked_mul(self.block_count)
    }

    /// Checks that an arena can be built from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the block size is not a power of two or is too small, if there are no
    /// blocks, or if the region would exceed `isize::MAX` bytes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(self.block_size));
        }
        if self.block_size < Self::MIN_BLOCK_SIZE {
            return Err(ConfigError::BlockSizeTooSmall {
                block_size: self.block_size,
                min: Self::MIN_BLOCK_SIZE,
            });
        }
        if self.block_count == 0 {
            return Err(ConfigError::NoBlocks);
        }
        match self.total_bytes() {
            Some(total) if total <= isize::MAX as usize => Ok(()),
            _ => Err(ConfigError::RegionTooLarge),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_SIZE, Self::DEFAULT_BLOCK_COUNT)
    }
}

impl std::fmt::Display for ArenaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.total_bytes().unwrap_or(usize::MAX) as u64;
        write!(
            f,
            "{} x {} ({})",
            self.block_count,
            ByteSize::b(self.block_size as u64).to_string_as(true),
            ByteSize::b(total).to_string_as(true)
        )
    }
}
