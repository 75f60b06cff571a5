//! Streaming payload decoder.
//!
//! Bits are read MSB-first and drive a walk from the root: `0` descends
//! left, `1` descends right, and reaching a leaf emits its byte and restarts
//! at the root. The payload length is not stored, so the reader keeps one
//! byte of lookahead to recognise the final byte, whose low `padding_bits`
//! bits are skipped.

use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{ArchiveError, Result};
use crate::tree::{EncodingTree, NodeKind};

/// Totals reported once unpacking completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    /// Payload bytes consumed from the source.
    pub bytes_read: u64,
    /// Decoded bytes written to the sink.
    pub bytes_written: u64,
}

/// Block reader that knows whether the byte it returns is the last one.
#[derive(Debug)]
struct LookaheadReader<R: Read> {
    source: R,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
    eof: bool,
}

impl<R: Read> LookaheadReader<R> {
    fn new(source: R, block_size: usize) -> Self {
        Self {
            source,
            buf: vec![0u8; block_size.max(1) + 1],
            pos: 0,
            filled: 0,
            eof: false,
        }
    }

    /// Read into `buf[from..]`, retrying on interruption.
    fn fill_from(&mut self, from: usize) -> Result<usize> {
        loop {
            match self.source.read(&mut self.buf[from..]) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Next byte and whether it is the final byte of the source.
    fn next_byte(&mut self) -> Result<Option<(u8, bool)>> {
        if self.pos >= self.filled {
            if self.eof {
                return Ok(None);
            }
            self.filled = self.fill_from(0)?;
            self.pos = 0;
            if self.filled == 0 {
                self.eof = true;
                return Ok(None);
            }
        }

        // Keep the unread tail byte at the front and top up behind it so a
        // zero-length read proves it is the last.
        while self.pos + 1 == self.filled && !self.eof {
            self.buf[0] = self.buf[self.pos];
            self.pos = 0;
            let n = self.fill_from(1)?;
            self.filled = 1 + n;
            if n == 0 {
                self.eof = true;
            }
        }

        let byte = self.buf[self.pos];
        self.pos += 1;
        let last = self.eof && self.pos == self.filled;
        Ok(Some((byte, last)))
    }
}

/// Decode the payload of `source` into `sink`.
///
/// # Arguments
/// * `source` - Packed payload, read until end of stream
/// * `tree` - Tree rebuilt from the archive header
/// * `padding_bits` - Unused low bits of the final payload byte (0-7)
/// * `sink` - Destination for decoded bytes
/// * `block_size` - Read and write chunk size
///
/// # Returns
/// Byte counts, or `CorruptStream` if the payload ends mid-symbol or the
/// final byte's padding is inconsistent.
pub fn unpack_stream<R: Read, W: Write>(
    source: R,
    tree: &EncodingTree,
    padding_bits: u8,
    sink: &mut W,
    block_size: usize,
) -> Result<UnpackSummary> {
    if padding_bits > 7 {
        return Err(ArchiveError::corrupt_stream(format!(
            "padding of {padding_bits} bits exceeds a byte"
        )));
    }

    let block_size = block_size.max(1);
    let mut reader = LookaheadReader::new(source, block_size);
    let mut out = Vec::with_capacity(block_size);
    let mut summary = UnpackSummary::default();
    let root = tree.root();
    let mut node = root;

    while let Some((byte, last)) = reader.next_byte()? {
        summary.bytes_read += 1;
        let usable = if last { 8 - padding_bits } else { 8 };

        if last && padding_bits > 0 && byte & ((1u8 << padding_bits) - 1) != 0 {
            return Err(ArchiveError::corrupt_stream(
                "final payload byte has non-zero padding bits",
            ));
        }

        for i in 0..usable {
            let bit = (byte >> (7 - i)) & 1 == 1;
            node = tree.child(node, bit).ok_or_else(|| {
                ArchiveError::corrupt_stream("decoder reached a leaf without emitting it")
            })?;

            if let NodeKind::Leaf(value) = tree.node(node).kind {
                out.push(value);
                node = root;
                if out.len() >= block_size {
                    sink.write_all(&out)?;
                    summary.bytes_written += out.len() as u64;
                    out.clear();
                }
            }
        }
    }

    if summary.bytes_read == 0 && padding_bits > 0 {
        return Err(ArchiveError::corrupt_stream(format!(
            "empty payload with {padding_bits} padding bits declared"
        )));
    }
    if node != root {
        return Err(ArchiveError::corrupt_stream(format!(
            "payload ends mid-symbol after {} bytes",
            summary.bytes_read
        )));
    }

    sink.write_all(&out)?;
    summary.bytes_written += out.len() as u64;
    sink.flush()?;

    trace!(
        read = summary.bytes_read,
        written = summary.bytes_written,
        "unpacked payload"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::ByteWeights;
    use std::io::Cursor;

    fn aaab_tree() -> EncodingTree {
        // b -> 0, a -> 1
        EncodingTree::build(&ByteWeights::from_bytes(b"aaab")).unwrap()
    }

    fn skewed_tree() -> EncodingTree {
        // a -> 000, b -> 001, c -> 01, d -> 1
        let mut counts = [0u64; 256];
        counts[usize::from(b'a')] = 1;
        counts[usize::from(b'b')] = 2;
        counts[usize::from(b'c')] = 4;
        counts[usize::from(b'd')] = 8;
        EncodingTree::build(&ByteWeights::from_counts(counts)).unwrap()
    }

    fn unpack(payload: &[u8], tree: &EncodingTree, padding: u8, block: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        unpack_stream(Cursor::new(payload), tree, padding, &mut out, block)?;
        Ok(out)
    }

    #[test]
    fn test_lookahead_marks_last() {
        let mut reader = LookaheadReader::new(Cursor::new(vec![1u8, 2, 3]), 2);
        assert_eq!(reader.next_byte().unwrap(), Some((1, false)));
        assert_eq!(reader.next_byte().unwrap(), Some((2, false)));
        assert_eq!(reader.next_byte().unwrap(), Some((3, true)));
        assert_eq!(reader.next_byte().unwrap(), None);
    }

    #[test]
    fn test_lookahead_single_byte_blocks() {
        let mut reader = LookaheadReader::new(Cursor::new(vec![7u8, 8]), 1);
        assert_eq!(reader.next_byte().unwrap(), Some((7, false)));
        assert_eq!(reader.next_byte().unwrap(), Some((8, true)));
        assert_eq!(reader.next_byte().unwrap(), None);
    }

    #[test]
    fn test_lookahead_empty() {
        let mut reader = LookaheadReader::new(Cursor::new(Vec::new()), 4);
        assert_eq!(reader.next_byte().unwrap(), None);
    }

    #[test]
    fn test_decode_aaab() {
        let out = unpack(&[0b1110_0000], &aaab_tree(), 4, 16).unwrap();
        assert_eq!(out, b"aaab");
    }

    #[test]
    fn test_decode_skewed_across_bytes() {
        // d c b a d d -> 1 01 001 000 1 1 = 10100100 011, padding 5
        let tree = skewed_tree();
        for block in [1, 2, 64] {
            let out = unpack(&[0b1010_0100, 0b0110_0000], &tree, 5, block).unwrap();
            assert_eq!(out, b"dcbadd");
        }
    }

    #[test]
    fn test_padding_zero_uses_all_bits() {
        // eight 1-bit codes: a a a a b b b b
        let out = unpack(&[0b1111_0000], &aaab_tree(), 0, 16).unwrap();
        assert_eq!(out, b"aaaabbbb");
    }

    #[test]
    fn test_mid_symbol() {
        // d then the first bit of c: 1 0 + padding 6
        let err = unpack(&[0b1000_0000], &skewed_tree(), 6, 16).unwrap_err();
        assert!(err.to_string().contains("mid-symbol"));
    }

    #[test]
    fn test_dirty_padding() {
        let err = unpack(&[0b1110_0001], &aaab_tree(), 4, 16).unwrap_err();
        assert!(err.to_string().contains("non-zero padding"));
    }

    #[test]
    fn test_empty_payload() {
        assert!(unpack(&[], &aaab_tree(), 0, 16).unwrap().is_empty());

        let err = unpack(&[], &aaab_tree(), 4, 16).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptStream(_)));
    }

    #[test]
    fn test_padding_out_of_range() {
        let err = unpack(&[0xFF], &aaab_tree(), 8, 16).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptStream(_)));
    }

    #[test]
    fn test_summary_counts() {
        let mut out = Vec::new();
        let summary = unpack_stream(
            Cursor::new(vec![0b1010_0100, 0b0110_0000]),
            &skewed_tree(),
            5,
            &mut out,
            3,
        )
        .unwrap();
        assert_eq!(summary.bytes_read, 2);
        assert_eq!(summary.bytes_written, 6);
    }
}
