//! Byte-to-code lookup table.
//!
//! Walking from the root, a left edge appends `0` and a right edge appends
//! `1`; the path to a leaf is that leaf's code. Codes are stored
//! right-justified: the first bit to emit is bit `len - 1` of `bits`.

#![allow(clippy::cast_possible_truncation)]

use crate::error::{ArchiveError, Result};
use crate::tree::{EncodingTree, NodeKind};
use crate::weights::{ByteWeights, SYMBOL_COUNT};

/// Longest code the 64-bit register can hold.
pub const MAX_CODE_LEN: usize = 64;

/// Variable-length code for one byte value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Code {
    /// Code value, right-justified.
    pub bits: u64,
    /// Number of significant bits (1-64); zero marks an absent byte.
    pub len: u8,
}

impl Code {
    /// Render the code as a string of `0`/`1`, first emitted bit first.
    pub fn to_bit_string(&self) -> String {
        (0..self.len)
            .rev()
            .map(|i| if (self.bits >> i) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

/// Encoding map indexed by byte value.
#[derive(Clone, Debug)]
pub struct CodeTable {
    codes: [Code; SYMBOL_COUNT],
}

impl CodeTable {
    /// Derive the code of every leaf in `tree`.
    ///
    /// # Returns
    /// The table, or `CodeTooLong` if a leaf sits deeper than
    /// [`MAX_CODE_LEN`].
    pub fn build(tree: &EncodingTree) -> Result<Self> {
        let mut codes = [Code::default(); SYMBOL_COUNT];
        let mut stack = vec![(tree.root(), 0u64, 0usize)];

        while let Some((id, bits, depth)) = stack.pop() {
            match tree.node(id).kind {
                NodeKind::Leaf(byte) => {
                    codes[usize::from(byte)] = Code {
                        bits,
                        len: depth as u8,
                    };
                }
                NodeKind::Internal { left, right } => {
                    if depth + 1 > MAX_CODE_LEN {
                        return Err(ArchiveError::CodeTooLong { depth: depth + 1 });
                    }
                    stack.push((right, (bits << 1) | 1, depth + 1));
                    stack.push((left, bits << 1, depth + 1));
                }
            }
        }

        Ok(Self { codes })
    }

    /// Code for `byte`, if the byte was present when the tree was built.
    #[inline]
    pub fn get(&self, byte: u8) -> Option<Code> {
        let code = self.codes[usize::from(byte)];
        (code.len > 0).then_some(code)
    }

    /// Exact number of payload bits needed to encode input with `weights`.
    pub fn payload_bits(&self, weights: &ByteWeights) -> u128 {
        weights
            .present()
            .map(|(byte, count)| {
                u128::from(count) * u128::from(self.codes[usize::from(byte)].len)
            })
            .sum()
    }

    /// Unused low bits in the final payload byte for input with `weights`.
    pub fn padding_bits(&self, weights: &ByteWeights) -> u8 {
        ((8 - self.payload_bits(weights) % 8) % 8) as u8
    }
}
