//! Huffman prefix tree.
//!
//! Nodes live in an arena and reference their children by index. Every node
//! is owned by exactly one parent, so the structure is a strict tree with no
//! back-references.
//!
//! ## Construction
//! The forest starts with one leaf per present byte value. The two lightest
//! nodes are repeatedly merged (first popped becomes the left child) until a
//! single root remains.
//!
//! ## Tie-break
//! The forest is ordered by `(weight, node id)`. Leaves receive ids in
//! ascending byte order and every merged node receives the next id, so among
//! equal weights the node created first is taken first. Trees are therefore
//! reproducible for a given frequency table.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::Result;
use crate::weights::ByteWeights;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// Leaf or internal node payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Terminal node carrying a byte value.
    Leaf(u8),
    /// Node with exactly two children.
    Internal { left: NodeId, right: NodeId },
}

/// Single node of the encoding tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeNode {
    /// Own frequency for leaves, sum of both children for internal nodes.
    /// Zero for trees rebuilt from an archive header.
    pub weight: u64,
    /// Leaf value or child links.
    pub kind: NodeKind,
}

impl TreeNode {
    /// Whether the node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

/// Binary prefix tree used for encoding and decoding.
#[derive(Clone, Debug)]
pub struct EncodingTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl EncodingTree {
    /// Build the optimal prefix tree for a frequency table.
    ///
    /// # Returns
    /// The tree, or `UnsupportedInput` if fewer than two byte values are
    /// present.
    pub fn build(weights: &ByteWeights) -> Result<Self> {
        weights.ensure_supported()?;

        let distinct = weights.distinct();
        let mut nodes = Vec::with_capacity(2 * distinct - 1);
        let mut forest = BinaryHeap::with_capacity(distinct);

        for (byte, weight) in weights.present() {
            forest.push(Reverse((weight, nodes.len())));
            nodes.push(TreeNode {
                weight,
                kind: NodeKind::Leaf(byte),
            });
        }

        while forest.len() > 1 {
            let (Some(Reverse((lw, left))), Some(Reverse((rw, right)))) =
                (forest.pop(), forest.pop())
            else {
                break;
            };

            let weight = lw + rw;
            forest.push(Reverse((weight, nodes.len())));
            nodes.push(TreeNode {
                weight,
                kind: NodeKind::Internal { left, right },
            });
        }

        // Last node pushed is the root; at least one merge happened.
        let root = nodes.len() - 1;
        let tree = Self { nodes, root };
        debug!(
            leaves = distinct,
            depth = tree.depth(),
            weight = tree.node(root).weight,
            "built encoding tree"
        );
        Ok(tree)
    }

    /// Assemble a tree from an arena already known to be well formed.
    pub(crate) fn from_parts(nodes: Vec<TreeNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// Root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Child reached by following `bit` (false = left, true = right), or
    /// `None` for a leaf.
    #[inline]
    pub fn child(&self, id: NodeId, bit: bool) -> Option<NodeId> {
        match self.nodes[id].kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Internal { left, right } => Some(if bit { right } else { left }),
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            match self.nodes[id].kind {
                NodeKind::Leaf(_) => max_depth = max_depth.max(depth),
                NodeKind::Internal { left, right } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        max_depth
    }

    /// Check that every internal weight equals the sum of its children.
    pub fn weights_consistent(&self) -> bool {
        self.nodes.iter().all(|node| match node.kind {
            NodeKind::Leaf(_) => true,
            NodeKind::Internal { left, right } => {
                node.weight == self.nodes[left].weight + self.nodes[right].weight
            }
        })
    }
}
