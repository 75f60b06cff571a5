//! Error types for archive compression/decompression.

use thiserror::Error;

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while archiving or unarchiving a byte stream.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Input has fewer than two distinct byte values
    #[error("unsupported input: {distinct} distinct byte value(s), at least 2 required")]
    UnsupportedInput { distinct: usize },

    /// Signature byte does not identify this format
    #[error("invalid format: signature 0x{found:02x}, expected 0x{expected:02x}")]
    InvalidFormat { found: u8, expected: u8 },

    /// Tree shape or leaf section inconsistent with the declared sizes
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// Payload ends mid-symbol or decodes to the wrong length
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// A code would not fit in the 64-bit code register
    #[error("code too long: tree depth {depth} exceeds 64 bits")]
    CodeTooLong { depth: usize },

    /// Source yielded a different number of bytes on the packing pass
    #[error("source changed between passes: scanned {expected} bytes, packed {actual}")]
    SourceChanged { expected: u64, actual: u64 },

    /// Read or write failure on either handle
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Create a corrupt header error.
    pub fn corrupt_header(message: impl Into<String>) -> Self {
        Self::CorruptHeader(message.into())
    }

    /// Create a corrupt stream error.
    pub fn corrupt_stream(message: impl Into<String>) -> Self {
        Self::CorruptStream(message.into())
    }

    /// Whether the error was caused by malformed archive data rather than
    /// the environment or the caller's input.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. } | Self::CorruptHeader(_) | Self::CorruptStream(_)
        )
    }
}
