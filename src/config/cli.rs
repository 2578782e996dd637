//! CLI argument parsing using clap

use super::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// fastagen - concurrent FASTA random sequence generator
///
/// Writes the three-section FASTA benchmark for length N to stdout.
#[derive(Parser, Debug, Default)]
#[command(name = "fastagen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Length multiplier N (sections hold 2N, 3N and 5N symbols) [default: 1000]
    #[arg(value_name = "N")]
    pub length: Option<usize>,

    /// TOML configuration file (CLI flags take precedence)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // === Pipeline Options ===
    /// Symbols per output line [default: 60]
    #[arg(long)]
    pub line_width: Option<usize>,

    /// Lines per pipeline chunk [default: 1024]
    #[arg(long)]
    pub chunk_lines: Option<usize>,

    /// Buffer pool depth, a power of two up to 1024 [default: 4]
    #[arg(short = 's', long)]
    pub slots: Option<usize>,

    /// Consumer worker threads [default: number of CPUs]
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Seed of the random source [default: 42]
    #[arg(long)]
    pub seed: Option<u32>,

    // === Output Options ===
    /// Write a JSON report to FILE
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Print a text summary to stderr
    #[arg(long)]
    pub summary: bool,

    // === Runtime Options ===
    /// Compare pipeline output with the sequential reference instead of
    /// writing it; exits non-zero on mismatch
    #[arg(long)]
    pub verify: bool,

    /// Log verbosity (RUST_LOG takes precedence)
    #[arg(long, value_enum, env = "FASTAGEN_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
