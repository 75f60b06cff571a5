//! Codec configuration.

/// Default streaming block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 65536;

/// Tunables shared by the compression and decompression passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    /// Size of the read and write chunks used while streaming.
    pub block_size: usize,
}

impl CodecOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Set the streaming block size. Zero is clamped to one byte.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(CodecOptions::default().block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_block_size_clamped() {
        assert_eq!(CodecOptions::new().with_block_size(0).block_size, 1);
        assert_eq!(CodecOptions::new().with_block_size(17).block_size, 17);
    }
}
