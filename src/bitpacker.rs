//! Streaming bit packer for the compressed payload.
//!
//! Codes are appended MSB-first into a pending byte. Each time the pending
//! byte fills it moves to an output block, which is written to the sink once
//! it reaches the configured block size.
//!
//! ## Bit Ordering
//! - First bit appended goes to bit position 7
//! - Second bit goes to position 6, etc.
//! - A partial final byte keeps its unused low bits at zero

#![allow(clippy::cast_possible_truncation)]

use std::io::{self, ErrorKind, Read, Write};

use crate::code_table::{Code, CodeTable};
use crate::error::{ArchiveError, Result};

/// Totals reported once packing completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackSummary {
    /// Unused low bits in the final byte (0-7).
    pub padding_bits: u8,
    /// Bytes written to the sink.
    pub bytes_written: u64,
}

/// Bit-level writer over a byte sink.
#[derive(Debug)]
pub struct BitPacker<W: Write> {
    /// Destination for completed blocks.
    sink: W,
    /// Completed bytes not yet written to the sink.
    block: Vec<u8>,
    /// Block flush threshold.
    block_size: usize,
    /// Byte currently being assembled.
    pending: u8,
    /// Number of bits already placed in `pending` (0-7).
    used: u8,
    /// Bytes handed to the sink so far.
    bytes_written: u64,
}

impl<W: Write> BitPacker<W> {
    /// Create a packer writing to `sink` in blocks of `block_size` bytes.
    pub fn new(sink: W, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            sink,
            block: Vec::with_capacity(block_size),
            block_size,
            pending: 0,
            used: 0,
            bytes_written: 0,
        }
    }

    /// Total number of bits appended so far.
    pub fn bit_len(&self) -> u64 {
        (self.bytes_written + self.block.len() as u64) * 8 + u64::from(self.used)
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) -> Result<()> {
        self.push_bits(u64::from(bit), 1)
    }

    /// Append a code from the table.
    #[inline]
    pub fn push_code(&mut self, code: Code) -> Result<()> {
        self.push_bits(code.bits, code.len)
    }

    /// Append the low `len` bits of `value`, most significant first.
    ///
    /// # Arguments
    /// * `value` - Bits to append (right-justified)
    /// * `len` - Number of bits to append (0-64)
    pub fn push_bits(&mut self, value: u64, len: u8) -> Result<()> {
        let mut remaining = len.min(64);

        while remaining > 0 {
            let room = 8 - self.used;
            let take = remaining.min(room);
            // Top `take` bits of what is left of the code.
            let chunk = ((value >> (remaining - take)) & ((1u64 << take) - 1)) as u8;
            self.pending |= chunk << (room - take);
            self.used += take;
            remaining -= take;

            if self.used == 8 {
                self.emit_pending()?;
            }
        }

        Ok(())
    }

    /// Move the pending byte to the output block.
    fn emit_pending(&mut self) -> Result<()> {
        self.block.push(self.pending);
        self.pending = 0;
        self.used = 0;

        if self.block.len() >= self.block_size {
            self.flush_block()?;
        }
        Ok(())
    }

    /// Write the output block to the sink.
    fn flush_block(&mut self) -> Result<()> {
        if !self.block.is_empty() {
            self.sink.write_all(&self.block)?;
            self.bytes_written += self.block.len() as u64;
            self.block.clear();
        }
        Ok(())
    }

    /// Flush the partial final byte, if any, and return the sink.
    ///
    /// # Returns
    /// The sink and a summary whose `padding_bits` is `8 - used` for a
    /// partial final byte and `0` when the last byte was filled exactly.
    pub fn finish(mut self) -> Result<(W, PackSummary)> {
        let padding_bits = if self.used > 0 {
            let padding = 8 - self.used;
            self.emit_pending()?;
            padding
        } else {
            0
        };
        self.flush_block()?;
        self.sink.flush()?;

        let summary = PackSummary {
            padding_bits,
            bytes_written: self.bytes_written,
        };
        Ok((self.sink, summary))
    }
}

/// Encode exactly `len` bytes of `source` into `packer`.
///
/// # Returns
/// The number of bytes consumed, or an error if the source fails, holds a
/// byte missing from the table, or yields a different length than `len`.
pub fn pack_stream<R: Read, W: Write>(
    source: &mut R,
    len: u64,
    table: &CodeTable,
    packer: &mut BitPacker<W>,
    block_size: usize,
) -> Result<u64> {
    let mut buffer = vec![0u8; block_size.max(1)];
    let mut limited = source.take(len);
    let mut consumed = 0u64;

    loop {
        let n = match limited.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        for &byte in &buffer[..n] {
            let code = table.get(byte).ok_or_else(|| {
                io::Error::new(
                    ErrorKind::InvalidData,
                    format!("byte 0x{byte:02x} has no code; source changed since scanning"),
                )
            })?;
            packer.push_code(code)?;
        }
        consumed += n as u64;
    }

    if consumed != len {
        return Err(ArchiveError::SourceChanged {
            expected: len,
            actual: consumed,
        });
    }
    Ok(consumed)
}
