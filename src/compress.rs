//! Archive compression.
//!
//! Pipeline: weight scan -> tree build -> tree serialization -> header
//! write -> code table -> payload packing.
//!
//! The padding count sits in the first header byte but is only produced by
//! packing. It is instead derived up front as `Σ weight × code length`, so
//! the header is written once and the sink never needs to seek. The packer
//! still reports its own count and the two must agree.

#![allow(clippy::cast_precision_loss)]

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::bitpacker::{pack_stream, BitPacker};
use crate::code_table::CodeTable;
use crate::error::{ArchiveError, Result};
use crate::header::ArchiveHeader;
use crate::options::CodecOptions;
use crate::tree::EncodingTree;
use crate::tree_codec;
use crate::weights::scan_weights;

/// Outcome of a successful compression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressStats {
    /// Bytes read from the source.
    pub original_size: u64,
    /// Bytes written to the sink, header included.
    pub compressed_size: u64,
    /// Padding bits recorded in the header.
    pub padding_bits: u8,
    /// Distinct byte values in the source.
    pub distinct_bytes: usize,
}

impl CompressStats {
    /// Output size as a percentage of input size (lower is better).
    pub fn ratio_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size as f64 / self.original_size as f64 * 100.0
    }
}

/// Compress `source_len` bytes of `source` into `sink` with default options.
///
/// The source is read twice, once to count bytes and once to encode them,
/// starting from its current position both times.
///
/// # Errors
///
/// Returns `ArchiveError` if:
/// - the source holds fewer than two distinct byte values
/// - either handle fails, or the source ends early
/// - the source changes between the two passes
pub fn compress<R, W>(source: &mut R, source_len: u64, sink: &mut W) -> Result<CompressStats>
where
    R: Read + Seek,
    W: Write,
{
    compress_with(source, source_len, sink, &CodecOptions::default())
}

/// Compress with explicit options.
pub fn compress_with<R, W>(
    source: &mut R,
    source_len: u64,
    sink: &mut W,
    options: &CodecOptions,
) -> Result<CompressStats>
where
    R: Read + Seek,
    W: Write,
{
    let start = source.stream_position()?;
    let weights = scan_weights(source, source_len, options.block_size)?;
    let tree = EncodingTree::build(&weights)?;
    let flat = tree_codec::serialize(&tree);
    let table = CodeTable::build(&tree)?;
    let padding_bits = table.padding_bits(&weights);

    let header = ArchiveHeader::new(padding_bits, &flat);
    header.write(sink)?;
    debug!(
        padding_bits,
        shape_bytes = header.shape_byte_count(),
        leaves = header.leaf_byte_count(),
        "wrote archive header"
    );

    source.seek(SeekFrom::Start(start))?;
    let mut packer = BitPacker::new(&mut *sink, options.block_size);
    pack_stream(source, source_len, &table, &mut packer, options.block_size)?;
    let (_, summary) = packer.finish()?;

    if summary.padding_bits != padding_bits {
        return Err(ArchiveError::corrupt_stream(format!(
            "packed {} padding bits, header records {padding_bits}",
            summary.padding_bits
        )));
    }

    let stats = CompressStats {
        original_size: source_len,
        compressed_size: header.encoded_len() as u64 + summary.bytes_written,
        padding_bits,
        distinct_bytes: weights.distinct(),
    };
    debug!(
        original = stats.original_size,
        compressed = stats.compressed_size,
        distinct = stats.distinct_bytes,
        "compressed stream"
    );
    Ok(stats)
}

/// Compress an in-memory buffer into a new archive.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    compress(&mut Cursor::new(data), data.len() as u64, &mut out)?;
    Ok(out)
}
