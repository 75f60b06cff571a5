//! Huffman archiver command line interface.
//!
//! Usage:
//!   huffarc [-a] <input> [output]     # archive (default: <input>.par)
//!   huffarc [-u] <input.par> [output] # unarchive (default: <input>.uar)
//!
//! Without a flag, inputs ending in `.par` are unarchived and anything else
//! is archived.

#![allow(clippy::cast_precision_loss)]

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;
use huffarc::{compress_with, decompress_with, CodecOptions, DEFAULT_BLOCK_SIZE};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Input used when none is given.
const DEFAULT_INPUT: &str = "test.txt";

/// Archive file extension.
const ARCHIVE_EXT: &str = ".par";

/// Unarchived file extension.
const UNARCHIVE_EXT: &str = ".uar";

/// Size units for human-readable output.
const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Static Huffman archiver
#[derive(Parser, Debug)]
#[command(name = "huffarc", version)]
#[command(about = "Compress or decompress a file with static Huffman coding")]
struct Args {
    /// Archive the input
    #[arg(short = 'a', long = "archive", conflicts_with = "unarchive")]
    archive: bool,

    /// Unarchive the input
    #[arg(short = 'u', long = "unarchive")]
    unarchive: bool,

    /// Input file
    #[arg(default_value = DEFAULT_INPUT)]
    input: String,

    /// Output file (derived from the input when omitted)
    output: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "HUFFARC_LOG_LEVEL")]
    log_level: String,

    /// Streaming block size in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE, env = "HUFFARC_BLOCK_SIZE")]
    block_size: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Archive,
    Unarchive,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.archive {
            Mode::Archive
        } else if self.unarchive || self.input.ends_with(ARCHIVE_EXT) {
            Mode::Unarchive
        } else {
            Mode::Archive
        }
    }
}

/// Derive the output filename for `input`.
///
/// Archiving appends `.par`. Unarchiving replaces a trailing `.par` with
/// `.uar`, or appends `.uar` otherwise.
fn default_output(input: &str, mode: Mode) -> String {
    match mode {
        Mode::Archive => format!("{input}{ARCHIVE_EXT}"),
        Mode::Unarchive => match input.strip_suffix(ARCHIVE_EXT) {
            Some(stem) => format!("{stem}{UNARCHIVE_EXT}"),
            None => format!("{input}{UNARCHIVE_EXT}"),
        },
    }
}

/// Format a byte count with the largest unit that keeps it under 1024.
fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < SIZE_UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", SIZE_UNITS[0])
    } else {
        format!("{value:.2} {}", SIZE_UNITS[unit])
    }
}

/// Check that `path` names a non-empty file and return its size.
fn input_size(path: &str) -> Result<u64, String> {
    let metadata = fs::metadata(path).map_err(|e| format!("Cannot open input file {path}: {e}"))?;
    if !metadata.is_file() {
        return Err(format!("Input {path} is not a file"));
    }
    if metadata.len() == 0 {
        return Err(format!("Input file {path} is empty"));
    }
    Ok(metadata.len())
}

/// Run one archive or unarchive operation, returning (input, output) sizes.
fn run(input: &str, output: &str, mode: Mode, options: &CodecOptions) -> Result<(u64, u64), String> {
    let in_size = input_size(input)?;
    let mut source = BufReader::with_capacity(
        options.block_size,
        File::open(input).map_err(|e| format!("Cannot open input file {input}: {e}"))?,
    );
    let mut sink = BufWriter::with_capacity(
        options.block_size,
        File::create(output).map_err(|e| format!("Cannot create output file {output}: {e}"))?,
    );

    let out_size = match mode {
        Mode::Archive => {
            info!(input, output, "compressing");
            compress_with(&mut source, in_size, &mut sink, options)
                .map_err(|e| format!("Compression failed: {e}"))?
                .compressed_size
        }
        Mode::Unarchive => {
            info!(input, output, "decompressing");
            decompress_with(&mut source, &mut sink, options)
                .map_err(|e| format!("Decompression failed: {e}"))?
                .decompressed_size
        }
    };

    Ok((in_size, out_size))
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("huffarc={}", args.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mode = args.mode();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, mode));
    let options = CodecOptions::new().with_block_size(args.block_size);

    if Path::new(&output) == Path::new(&args.input) {
        eprintln!("Error: input and output are the same file");
        process::exit(1);
    }

    let start = Instant::now();
    match run(&args.input, &output, mode, &options) {
        Ok((in_size, out_size)) => {
            let elapsed = start.elapsed().as_secs_f64();
            let ratio = out_size as f64 / in_size as f64 * 100.0;
            println!("Input:       {} ({})", args.input, format_size(in_size));
            println!("Output:      {output} ({})", format_size(out_size));
            println!("Ratio:       {ratio:.2}% (lower is better, 100% is no compression)");
            println!("Time:        {elapsed:.3} s");
        }
        Err(e) => {
            error!(input = %args.input, "operation failed");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
