//! Byte frequency analysis.
//!
//! A single block-buffered pass over the source counts how often each of the
//! 256 byte values occurs. The resulting table drives tree construction and
//! is read-only afterwards.

use std::io::{self, ErrorKind, Read};

use tracing::debug;

use crate::error::{ArchiveError, Result};

/// Number of distinct byte values.
pub const SYMBOL_COUNT: usize = 256;

/// Occurrence count per byte value, indexed by the byte itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteWeights {
    counts: [u64; SYMBOL_COUNT],
}

impl ByteWeights {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            counts: [0; SYMBOL_COUNT],
        }
    }

    /// Count the bytes of an in-memory buffer.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut weights = Self::new();
        weights.add(data);
        weights
    }

    /// Build a table from explicit counts.
    pub fn from_counts(counts: [u64; SYMBOL_COUNT]) -> Self {
        Self { counts }
    }

    /// Accumulate the bytes of `block`.
    pub fn add(&mut self, block: &[u8]) {
        for &byte in block {
            self.counts[usize::from(byte)] += 1;
        }
    }

    /// Occurrence count of `byte`.
    #[inline]
    pub fn get(&self, byte: u8) -> u64 {
        self.counts[usize::from(byte)]
    }

    /// Raw counts.
    pub fn counts(&self) -> &[u64; SYMBOL_COUNT] {
        &self.counts
    }

    /// Sum of all counts, i.e. the input length.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of byte values with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Present byte values and their counts, in ascending byte order.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .zip(self.counts.iter().copied())
            .filter(|&(_, count)| count > 0)
    }

    /// Whether the input can be given a non-empty prefix code.
    pub fn is_file_correct(&self) -> bool {
        self.distinct() >= 2
    }

    /// Reject inputs with fewer than two distinct byte values.
    pub fn ensure_supported(&self) -> Result<()> {
        if self.is_file_correct() {
            Ok(())
        } else {
            Err(ArchiveError::UnsupportedInput {
                distinct: self.distinct(),
            })
        }
    }
}

impl Default for ByteWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan exactly `len` bytes of `source` and count them.
///
/// # Arguments
/// * `source` - Byte source positioned at the first byte to count
/// * `len` - Number of bytes the source is known to hold
/// * `block_size` - Read chunk size
///
/// # Returns
/// The frequency table, or `Io` if the source fails or ends early.
pub fn scan_weights<R: Read>(source: &mut R, len: u64, block_size: usize) -> Result<ByteWeights> {
    let mut weights = ByteWeights::new();
    let mut buffer = vec![0u8; block_size.max(1)];
    let mut limited = source.take(len);
    let mut scanned = 0u64;

    loop {
        let n = match limited.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        weights.add(&buffer[..n]);
        scanned += n as u64;
    }

    if scanned != len {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("source ended after {scanned} of {len} bytes"),
        )
        .into());
    }

    debug!(bytes = scanned, distinct = weights.distinct(), "scanned weights");
    Ok(weights)
}
