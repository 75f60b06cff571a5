//! End-to-end archive tests.
//!
//! These tests run whole compress/decompress cycles over the public API and
//! check the exact archive bytes wherever the expected tree is unambiguous.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Cursor, Write};

use huffarc::{
    compress, compress_bytes, compress_with, decompress, decompress_bytes, decompress_with,
    ArchiveError, ArchiveHeader, CodecOptions, FIXED_HEADER_LEN, SIGNATURE,
};

/// Round-trip case.
struct TestVector {
    name: &'static str,
    input: fn() -> Vec<u8>,
}

fn fibonacci_counts() -> Vec<u8> {
    // Counts 1, 1, 2, 3, 5, ... give the deepest possible tree.
    let (mut a, mut b) = (1usize, 1usize);
    let mut data = Vec::new();
    for symbol in 0..20u8 {
        data.extend(std::iter::repeat(symbol).take(a));
        (a, b) = (b, a + b);
    }
    data
}

fn two_symbols() -> Vec<u8> {
    b"ab".to_vec()
}

fn text() -> Vec<u8> {
    b"It was the best of times, it was the worst of times, it was the age of wisdom".to_vec()
}

fn all_bytes() -> Vec<u8> {
    (0..=255).collect()
}

fn binary_ramp() -> Vec<u8> {
    (0..70_000u32)
        .map(|i| (i % 251) as u8 ^ (i >> 9) as u8)
        .collect()
}

fn mostly_zero() -> Vec<u8> {
    let mut data = vec![0u8; 10_000];
    data[5_000] = 1;
    data
}

const TEST_VECTORS: &[TestVector] = &[
    TestVector {
        name: "two-symbols",
        input: two_symbols,
    },
    TestVector {
        name: "text",
        input: text,
    },
    TestVector {
        name: "all-bytes",
        input: all_bytes,
    },
    TestVector {
        name: "binary-ramp",
        input: binary_ramp,
    },
    TestVector {
        name: "fibonacci",
        input: fibonacci_counts,
    },
    TestVector {
        name: "mostly-zero",
        input: mostly_zero,
    },
];

fn round_trip(vector: &TestVector, options: &CodecOptions) {
    let input = (vector.input)();

    let mut archive = Vec::new();
    let compressed = compress_with(
        &mut Cursor::new(&input),
        input.len() as u64,
        &mut archive,
        options,
    )
    .unwrap_or_else(|e| panic!("Compression failed for {}: {}", vector.name, e));
    assert_eq!(compressed.compressed_size, archive.len() as u64, "{}", vector.name);
    assert_eq!(archive[0], compressed.padding_bits, "{}", vector.name);

    let mut output = Vec::new();
    let decompressed = decompress_with(&mut Cursor::new(&archive), &mut output, options)
        .unwrap_or_else(|e| panic!("Decompression failed for {}: {}", vector.name, e));

    assert_eq!(decompressed.decompressed_size, input.len() as u64, "{}", vector.name);
    assert_eq!(decompressed.compressed_size, archive.len() as u64, "{}", vector.name);
    assert_eq!(
        output, input,
        "{}: Decompressed data differs from original",
        vector.name
    );
}

#[test]
fn test_round_trip_default_blocks() {
    for vector in TEST_VECTORS {
        round_trip(vector, &CodecOptions::default());
    }
}

#[test]
fn test_round_trip_tiny_blocks() {
    for block_size in [1, 2, 3, 17] {
        let options = CodecOptions::new().with_block_size(block_size);
        for vector in TEST_VECTORS {
            round_trip(vector, &options);
        }
    }
}

#[test]
fn test_aaab_layout() {
    let archive = compress_bytes(b"aaab").unwrap();

    // 2-leaf tree, 1-bit codes, one payload byte holding 4 code bits.
    assert_eq!(archive[0], 4);
    assert_eq!(archive[1], SIGNATURE);
    assert_eq!(archive[2], 1);
    assert_eq!(archive[3], 1);
    assert_eq!(archive.len(), FIXED_HEADER_LEN + 1 + 2 + 1);
    assert_eq!(decompress_bytes(&archive).unwrap(), b"aaab");
}

#[test]
fn test_all_bytes_leaf_field() {
    let input: Vec<u8> = (0..=255).collect();
    let archive = compress_bytes(&input).unwrap();

    assert_eq!(archive[3], 255);
    let header = ArchiveHeader::read(&mut Cursor::new(&archive)).unwrap();
    assert_eq!(header.leaf_byte_count(), 256);
    assert_eq!(header.shape_byte_count(), 64);
}

#[test]
fn test_uniform_overhead_is_header_only() {
    let input: Vec<u8> = (0..1024u32).map(|i| i as u8).collect();
    let archive = compress_bytes(&input).unwrap();
    let header = ArchiveHeader::read(&mut Cursor::new(&archive)).unwrap();

    assert_eq!(archive.len(), input.len() + header.encoded_len());
    assert_eq!(archive[0], 0);
}

#[test]
fn test_skewed_beats_fixed_width() {
    let input: Vec<u8> = (0..4096u32)
        .map(|i| match i % 16 {
            0..=9 => b'e',
            10..=12 => b't',
            13 | 14 => b'a',
            _ => b'q',
        })
        .collect();
    let archive = compress_bytes(&input).unwrap();
    let header = ArchiveHeader::read(&mut Cursor::new(&archive)).unwrap();

    let payload_bits = (archive.len() - header.encoded_len()) as u64 * 8 - u64::from(archive[0]);
    // Four symbols would need 2 bits each with a fixed-width code.
    assert!(payload_bits < input.len() as u64 * 2);
    assert!(archive.len() < input.len());
}

#[test]
fn test_single_symbol_rejected() {
    let err = compress_bytes(&[7u8; 100]).unwrap_err();
    assert!(matches!(err, ArchiveError::UnsupportedInput { distinct: 1 }));
}

#[test]
fn test_flipped_signature() {
    let mut archive = compress_bytes(b"hello huffman").unwrap();
    archive[1] = !archive[1];

    let mut output = Vec::new();
    let err = decompress(&mut Cursor::new(&archive), &mut output).unwrap_err();
    assert!(matches!(err, ArchiveError::InvalidFormat { .. }));
    assert!(output.is_empty());
}

#[test]
fn test_truncated_single_payload_byte() {
    let mut archive = compress_bytes(b"aaab").unwrap();
    archive.pop();

    let err = decompress_bytes(&archive).unwrap_err();
    assert!(matches!(err, ArchiveError::CorruptStream(_)));
}

#[test]
fn test_truncated_payload() {
    // a=1, b=0: 1110 1110 1110 -> EE E0, padding 4
    let mut archive = compress_bytes(b"aaabaaabaaab").unwrap();
    assert_eq!(&archive[archive.len() - 2..], &[0xEE, 0xE0]);
    archive.pop();

    let err = decompress_bytes(&archive).unwrap_err();
    assert!(matches!(err, ArchiveError::CorruptStream(_)));
    assert!(err.is_corruption());
}

#[test]
fn test_truncated_header() {
    let archive = compress_bytes(b"header cut short").unwrap();
    let err = decompress_bytes(&archive[..6]).unwrap_err();
    assert!(matches!(err, ArchiveError::CorruptHeader(_)));
}

/// Writer that fails after accepting a fixed number of bytes.
struct FailingWriter {
    budget: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::other("disk full"));
        }
        let n = buf.len().min(self.budget);
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_sink_failure_surfaces_as_io() {
    let input = b"some bytes that will not fit".to_vec();
    let mut sink = FailingWriter { budget: 5 };
    let err = compress(&mut Cursor::new(&input), input.len() as u64, &mut sink).unwrap_err();
    assert!(matches!(err, ArchiveError::Io(_)));

    let archive = compress_bytes(&input).unwrap();
    let mut sink = FailingWriter { budget: 3 };
    let err = decompress(&mut Cursor::new(&archive), &mut sink).unwrap_err();
    assert!(matches!(err, ArchiveError::Io(_)));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("notes.txt");
    let archived = dir.path().join("notes.txt.par");
    let restored = dir.path().join("notes.txt.uar");

    let input: Vec<u8> = (0..200_000u32).map(|i| b"etaoin shrdlu"[(i % 13) as usize]).collect();
    fs::write(&original, &input).unwrap();

    {
        let mut source = BufReader::new(File::open(&original).unwrap());
        let mut sink = BufWriter::new(File::create(&archived).unwrap());
        let stats = compress(&mut source, input.len() as u64, &mut sink).unwrap();
        sink.flush().unwrap();
        drop(sink);
        assert_eq!(fs::metadata(&archived).unwrap().len(), stats.compressed_size);
    }

    {
        let mut source = BufReader::new(File::open(&archived).unwrap());
        let mut sink = BufWriter::new(File::create(&restored).unwrap());
        let stats = decompress(&mut source, &mut sink).unwrap();
        sink.flush().unwrap();
        assert_eq!(stats.decompressed_size, input.len() as u64);
    }

    assert_eq!(fs::read(&restored).unwrap(), input);
}
