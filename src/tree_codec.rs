//! Tree serialization for the archive header.
//!
//! A tree is flattened by a pre-order walk into two sections:
//! - **shape**: one bit per node, `1` for internal and `0` for leaf
//! - **leaves**: one byte per leaf, in the order the walk meets them
//!
//! The shape bits are packed MSB-first and the final byte is zero padded.
//! Because of that padding the number of leaves, not the shape length,
//! tells the reader where the tree ends.

use tracing::trace;

use crate::error::{ArchiveError, Result};
use crate::tree::{EncodingTree, NodeId, NodeKind, TreeNode};
use crate::weights::SYMBOL_COUNT;

/// Flattened pre-order representation of a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeShape {
    /// `true` for internal nodes, `false` for leaves.
    pub shape: Vec<bool>,
    /// Leaf byte values in traversal order.
    pub leaves: Vec<u8>,
}

impl TreeShape {
    /// Shape bits packed MSB-first, last byte zero padded.
    pub fn packed_shape(&self) -> Vec<u8> {
        let mut packed = vec![0u8; self.shape.len().div_ceil(8)];
        for (i, &bit) in self.shape.iter().enumerate() {
            if bit {
                packed[i / 8] |= 0x80 >> (i % 8);
            }
        }
        packed
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }
}

/// Flatten `tree` by pre-order traversal.
pub fn serialize(tree: &EncodingTree) -> TreeShape {
    let mut shape = Vec::with_capacity(tree.len());
    let mut leaves = Vec::with_capacity(tree.len().div_ceil(2));
    let mut stack = vec![tree.root()];

    while let Some(id) = stack.pop() {
        match tree.node(id).kind {
            NodeKind::Leaf(byte) => {
                shape.push(false);
                leaves.push(byte);
            }
            NodeKind::Internal { left, right } => {
                shape.push(true);
                stack.push(right);
                stack.push(left);
            }
        }
    }

    TreeShape { shape, leaves }
}

/// Rebuild a tree from packed shape bytes and leaf bytes.
///
/// # Arguments
/// * `packed_shape` - Pre-order shape bits, MSB-first, zero padded
/// * `leaves` - Leaf values in traversal order
///
/// # Returns
/// The tree, or `CorruptHeader` if either section runs out before the tree
/// is complete, or if any part of either section is left unused.
pub fn deserialize(packed_shape: &[u8], leaves: &[u8]) -> Result<EncodingTree> {
    if leaves.len() < 2 || leaves.len() > SYMBOL_COUNT {
        return Err(ArchiveError::corrupt_header(format!(
            "{} leaves, expected 2-{SYMBOL_COUNT}",
            leaves.len()
        )));
    }

    let total_bits = packed_shape.len() * 8;
    let mut nodes: Vec<TreeNode> = Vec::with_capacity(2 * leaves.len() - 1);
    // Internal nodes still waiting for a child, with how many they have.
    let mut open: Vec<(NodeId, u8)> = Vec::new();
    let mut bit_pos = 0;
    let mut leaf_pos = 0;

    loop {
        if bit_pos >= total_bits {
            return Err(ArchiveError::corrupt_header(
                "tree shape ended before the tree was complete",
            ));
        }
        let internal = (packed_shape[bit_pos / 8] >> (7 - bit_pos % 8)) & 1 == 1;
        bit_pos += 1;

        let id = nodes.len();
        let kind = if internal {
            NodeKind::Internal {
                left: NodeId::MAX,
                right: NodeId::MAX,
            }
        } else {
            let byte = *leaves.get(leaf_pos).ok_or_else(|| {
                ArchiveError::corrupt_header("leaf bytes exhausted before the tree was complete")
            })?;
            leaf_pos += 1;
            NodeKind::Leaf(byte)
        };
        nodes.push(TreeNode { weight: 0, kind });

        if id == 0 && !internal {
            return Err(ArchiveError::corrupt_header("tree root is a leaf"));
        }

        if let Some((parent, filled)) = open.last_mut() {
            if let NodeKind::Internal { left, right } = &mut nodes[*parent].kind {
                if *filled == 0 {
                    *left = id;
                } else {
                    *right = id;
                }
            }
            *filled += 1;
            if *filled == 2 {
                open.pop();
            }
        }

        if internal {
            open.push((id, 0));
        }
        if open.is_empty() {
            break;
        }
    }

    if leaf_pos != leaves.len() {
        return Err(ArchiveError::corrupt_header(format!(
            "tree uses {leaf_pos} leaves, header declares {}",
            leaves.len()
        )));
    }
    if bit_pos.div_ceil(8) != packed_shape.len() {
        return Err(ArchiveError::corrupt_header(format!(
            "tree shape uses {bit_pos} bits, header declares {} bytes",
            packed_shape.len()
        )));
    }
    let tail_bits = total_bits - bit_pos;
    if tail_bits > 0 && packed_shape[packed_shape.len() - 1] & ((1u8 << tail_bits) - 1) != 0 {
        return Err(ArchiveError::corrupt_header("non-zero tree shape padding"));
    }

    trace!(nodes = nodes.len(), leaves = leaf_pos, "rebuilt encoding tree");
    Ok(EncodingTree::from_parts(nodes, 0))
}
