//! Archive header layout.
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 1 | padding bits in the final payload byte (0-7) |
//! | 1 | 1 | signature `0x3a` |
//! | 2 | 1 | tree shape size in bytes |
//! | 3 | 1 | leaf count minus one |
//! | 4 | shape size | pre-order tree shape, MSB-first |
//! | 4 + shape size | leaf count | leaf byte values |
//!
//! The packed payload follows immediately.

#![allow(clippy::cast_possible_truncation)]

use std::io::{ErrorKind, Read, Write};

use crate::error::{ArchiveError, Result};
use crate::tree::EncodingTree;
use crate::tree_codec::{self, TreeShape};
use crate::weights::SYMBOL_COUNT;

/// Format signature.
pub const SIGNATURE: u8 = 0x3a;

/// Size of the fixed part of the header.
pub const FIXED_HEADER_LEN: usize = 4;

/// Parsed or to-be-written archive header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Unused low bits of the final payload byte (0-7).
    pub padding_bits: u8,
    /// Packed pre-order tree shape.
    pub shape: Vec<u8>,
    /// Leaf values in traversal order.
    pub leaves: Vec<u8>,
}

impl ArchiveHeader {
    /// Create a header for a serialized tree.
    pub fn new(padding_bits: u8, tree: &TreeShape) -> Self {
        Self {
            padding_bits,
            shape: tree.packed_shape(),
            leaves: tree.leaves.clone(),
        }
    }

    /// Size of the packed tree shape in bytes.
    pub fn shape_byte_count(&self) -> usize {
        self.shape.len()
    }

    /// Number of leaf bytes.
    pub fn leaf_byte_count(&self) -> usize {
        self.leaves.len()
    }

    /// Total encoded size of the header in bytes.
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN + self.shape.len() + self.leaves.len()
    }

    /// Serialize the header.
    ///
    /// # Returns
    /// `Ok(())`, or `CorruptHeader` if a field does not fit its byte.
    pub fn write<W: Write>(&self, sink: &mut W) -> Result<()> {
        if self.padding_bits > 7 {
            return Err(ArchiveError::corrupt_header(format!(
                "padding of {} bits exceeds a byte",
                self.padding_bits
            )));
        }
        if self.shape.len() > usize::from(u8::MAX) {
            return Err(ArchiveError::corrupt_header(format!(
                "tree shape of {} bytes does not fit the header",
                self.shape.len()
            )));
        }
        if self.leaves.is_empty() || self.leaves.len() > SYMBOL_COUNT {
            return Err(ArchiveError::corrupt_header(format!(
                "{} leaves, expected 1-{SYMBOL_COUNT}",
                self.leaves.len()
            )));
        }

        let fixed = [
            self.padding_bits,
            SIGNATURE,
            self.shape.len() as u8,
            (self.leaves.len() - 1) as u8,
        ];
        sink.write_all(&fixed)?;
        sink.write_all(&self.shape)?;
        sink.write_all(&self.leaves)?;
        Ok(())
    }

    /// Parse a header from the start of an archive.
    ///
    /// The signature is checked before anything past it is read.
    pub fn read<R: Read>(source: &mut R) -> Result<Self> {
        let mut lead = [0u8; 2];
        read_section(source, &mut lead, "fixed header")?;
        let [padding_bits, signature] = lead;

        if signature != SIGNATURE {
            return Err(ArchiveError::InvalidFormat {
                found: signature,
                expected: SIGNATURE,
            });
        }
        if padding_bits > 7 {
            return Err(ArchiveError::corrupt_header(format!(
                "padding of {padding_bits} bits exceeds a byte"
            )));
        }

        let mut sizes = [0u8; 2];
        read_section(source, &mut sizes, "fixed header")?;
        let shape_len = usize::from(sizes[0]);
        let leaf_len = usize::from(sizes[1]) + 1;

        let mut shape = vec![0u8; shape_len];
        read_section(source, &mut shape, "tree shape")?;
        let mut leaves = vec![0u8; leaf_len];
        read_section(source, &mut leaves, "tree leaves")?;

        Ok(Self {
            padding_bits,
            shape,
            leaves,
        })
    }

    /// Rebuild the encoding tree described by the header.
    pub fn to_tree(&self) -> Result<EncodingTree> {
        tree_codec::deserialize(&self.shape, &self.leaves)
    }
}

/// `read_exact` that reports a short archive as a corrupt header.
fn read_section<R: Read>(source: &mut R, buf: &mut [u8], section: &str) -> Result<()> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            ArchiveError::corrupt_header(format!("archive ends inside the {section}"))
        } else {
            ArchiveError::Io(e)
        }
    })
}
