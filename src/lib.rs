//! # huffarc
//!
//! Lossless static Huffman archiver for arbitrary byte streams.
//!
//! ## Design
//!
//! - **Single pass per direction** - one frequency scan plus one packing pass
//!   to compress, one streaming pass to decompress
//! - **Safe Rust** - `#![forbid(unsafe_code)]`
//! - **No seek on output** - the header is written once, with its final
//!   padding count, before the payload
//! - **Bounded stack** - all tree walks use explicit stacks
//!
//! ## Archive Format
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 1 | padding bits in the final payload byte (0-7) |
//! | 1 | 1 | signature `0x3a` |
//! | 2 | 1 | tree shape size in bytes |
//! | 3 | 1 | leaf count minus one |
//! | 4 | shape size | pre-order tree shape, MSB-first |
//! | … | leaf count | leaf byte values |
//! | … | remainder | packed codes, MSB-first |
//!
//! ## API Overview
//!
//! ### High-Level Functions
//!
//! - [`compress()`] - Compress a seekable source of known length into a sink
//! - [`decompress()`] - Decompress an archive stream into a sink
//! - [`compress_bytes()`] / [`decompress_bytes()`] - In-memory variants
//!
//! ### Low-Level Components
//!
//! - [`ByteWeights`] / [`scan_weights`] - Frequency analysis
//! - [`EncodingTree`] - Optimal prefix tree construction
//! - [`tree_codec`] - Tree shape serialization
//! - [`CodeTable`] - Byte-to-code map
//! - [`BitPacker`] / [`unpack_stream`] - Payload bit packing and decoding
//! - [`ArchiveHeader`] - Header layout
//!
//! ## Usage
//!
//! ```rust
//! use huffarc::{compress_bytes, decompress_bytes};
//!
//! let data = b"abracadabra".to_vec();
//! let archive = compress_bytes(&data).unwrap();
//! assert_eq!(decompress_bytes(&archive).unwrap(), data);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

mod bitpacker;
mod bitunpacker;
mod code_table;
mod compress;
mod decompress;
mod error;
mod header;
mod options;
mod tree;
pub mod tree_codec;
mod weights;

pub use bitpacker::{pack_stream, BitPacker, PackSummary};
pub use bitunpacker::{unpack_stream, UnpackSummary};
pub use code_table::{Code, CodeTable, MAX_CODE_LEN};
pub use compress::{compress, compress_bytes, compress_with, CompressStats};
pub use decompress::{decompress, decompress_bytes, decompress_with, DecompressStats};
pub use error::{ArchiveError, Result};
pub use header::{ArchiveHeader, FIXED_HEADER_LEN, SIGNATURE};
pub use options::{CodecOptions, DEFAULT_BLOCK_SIZE};
pub use tree::{EncodingTree, NodeId, NodeKind, TreeNode};
pub use tree_codec::TreeShape;
pub use weights::{scan_weights, ByteWeights, SYMBOL_COUNT};
