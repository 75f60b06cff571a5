//! Throughput benchmarks for Huffman archiving.
//!
//! Measures compression and decompression throughput on synthetic inputs
//! for regression testing during development.
//!
//! Usage:
//!   cargo run --release --bin bench          # Run with default 20 iterations
//!   cargo run --release --bin bench -- 100   # Run with custom iteration count

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use huffarc::{compress_bytes, decompress_bytes};
use std::env;
use std::time::Instant;

const DEFAULT_ITERATIONS: usize = 20;
const INPUT_SIZE: usize = 4 * 1024 * 1024;

struct BenchConfig {
    name: &'static str,
    generate: fn(usize) -> Vec<u8>,
}

/// English-like text with a skewed byte distribution.
fn text(len: usize) -> Vec<u8> {
    const SAMPLE: &[u8] = b"the quick brown fox jumps over the lazy dog while \
        huffman codes give the frequent letters the shortest paths. ";
    SAMPLE.iter().copied().cycle().take(len).collect()
}

/// Every byte value equally often.
fn uniform(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

/// Geometric-ish distribution over a small alphabet.
fn skewed(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state.trailing_zeros().min(15)) as u8
        })
        .collect()
}

const BENCHMARKS: &[BenchConfig] = &[
    BenchConfig {
        name: "text",
        generate: text,
    },
    BenchConfig {
        name: "uniform",
        generate: uniform,
    },
    BenchConfig {
        name: "skewed",
        generate: skewed,
    },
];

fn report(name: &str, bytes: usize, iterations: usize, start: Instant) {
    let per_iter_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;
    let mb_per_s = bytes as f64 / (1024.0 * 1024.0) / (per_iter_ms / 1000.0);
    println!("{name:<20} {per_iter_ms:>10.2} ms/iter  {mb_per_s:>8.1} MB/s");
}

fn bench_compress(config: &BenchConfig, iterations: usize) {
    let input = (config.generate)(INPUT_SIZE);

    // Warmup run
    let _ = compress_bytes(&input);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = compress_bytes(&input);
    }
    report(config.name, input.len(), iterations, start);
}

fn bench_decompress(config: &BenchConfig, iterations: usize) {
    let input = (config.generate)(INPUT_SIZE);
    let compressed = match compress_bytes(&input) {
        Ok(data) => data,
        Err(e) => {
            println!("{:<20} SKIP (compression failed: {e})", config.name);
            return;
        }
    };

    // Warmup run
    let _ = decompress_bytes(&compressed);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = decompress_bytes(&compressed);
    }
    report(config.name, input.len(), iterations, start);

    let ratio = compressed.len() as f64 / input.len() as f64 * 100.0;
    println!("{:<20} ratio {ratio:.1}%", "");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let iterations = if args.len() >= 2 {
        args[1].parse().unwrap_or(DEFAULT_ITERATIONS)
    } else {
        DEFAULT_ITERATIONS
    };

    println!("Huffman Archiver Benchmarks");
    println!("===========================");
    println!("Iterations: {iterations}");
    println!("Input size: {INPUT_SIZE} bytes");

    println!("\nCompression:");
    for config in BENCHMARKS {
        bench_compress(config, iterations);
    }

    println!("\nDecompression:");
    for config in BENCHMARKS {
        bench_decompress(config, iterations);
    }
}
