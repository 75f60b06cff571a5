//! Archive decompression.
//!
//! Pipeline: header read -> tree rebuild -> payload unpacking. The header's
//! signature is verified before the tree is touched, and nothing reaches
//! the sink until the header has been fully validated.

use std::io::{Cursor, Read, Write};

use tracing::debug;

use crate::bitunpacker::unpack_stream;
use crate::error::Result;
use crate::header::ArchiveHeader;
use crate::options::CodecOptions;

/// Outcome of a successful decompression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecompressStats {
    /// Bytes read from the source, header included.
    pub compressed_size: u64,
    /// Bytes written to the sink.
    pub decompressed_size: u64,
}

/// Decompress an archive read from `source` into `sink` with default
/// options.
///
/// # Errors
///
/// Returns `ArchiveError` if:
/// - the signature does not match (`InvalidFormat`)
/// - the tree sections are inconsistent (`CorruptHeader`)
/// - the payload is truncated or malformed (`CorruptStream`)
/// - either handle fails (`Io`)
pub fn decompress<R: Read, W: Write>(source: &mut R, sink: &mut W) -> Result<DecompressStats> {
    decompress_with(source, sink, &CodecOptions::default())
}

/// Decompress with explicit options.
pub fn decompress_with<R: Read, W: Write>(
    source: &mut R,
    sink: &mut W,
    options: &CodecOptions,
) -> Result<DecompressStats> {
    let header = ArchiveHeader::read(source)?;
    let tree = header.to_tree()?;
    debug!(
        padding_bits = header.padding_bits,
        leaves = header.leaf_byte_count(),
        depth = tree.depth(),
        "read archive header"
    );

    let summary = unpack_stream(
        &mut *source,
        &tree,
        header.padding_bits,
        sink,
        options.block_size,
    )?;

    let stats = DecompressStats {
        compressed_size: header.encoded_len() as u64 + summary.bytes_read,
        decompressed_size: summary.bytes_written,
    };
    debug!(
        compressed = stats.compressed_size,
        decompressed = stats.decompressed_size,
        "decompressed stream"
    );
    Ok(stats)
}

/// Decompress an in-memory archive.
pub fn decompress_bytes(archive: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress(&mut Cursor::new(archive), &mut out)?;
    Ok(out)
}
