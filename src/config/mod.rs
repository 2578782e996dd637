//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::coordinator::{PipelineConfig, DEFAULT_CHUNK_LINES, DEFAULT_LINE_WIDTH, DEFAULT_SLOTS};
use crate::distribution::lcg::DEFAULT_SEED;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default length multiplier
pub const DEFAULT_LENGTH: usize = 1000;

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Sequence generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Length multiplier `n` (sections are 2n, 3n and 5n symbols)
    #[serde(default = "default_length")]
    pub length: usize,
    /// Symbols per output line
    #[serde(default = "default_line_width")]
    pub line_width: usize,
    /// Lines per pipeline chunk
    #[serde(default = "default_chunk_lines")]
    pub chunk_lines: usize,
    /// Buffer pool depth (power of two, 1-1024)
    #[serde(default = "default_pool_slots")]
    pub pool_slots: usize,
    /// Consumer worker threads (defaults to the number of CPUs)
    pub consumer_threads: Option<usize>,
    /// Seed of the random source
    #[serde(default = "default_seed")]
    pub seed: u32,
}

fn default_length() -> usize {
    DEFAULT_LENGTH
}

fn default_line_width() -> usize {
    DEFAULT_LINE_WIDTH
}

fn default_chunk_lines() -> usize {
    DEFAULT_CHUNK_LINES
}

fn default_pool_slots() -> usize {
    DEFAULT_SLOTS
}

fn default_seed() -> u32 {
    DEFAULT_SEED
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            line_width: default_line_width(),
            chunk_lines: default_chunk_lines(),
            pool_slots: default_pool_slots(),
            consumer_threads: None,
            seed: default_seed(),
        }
    }
}

/// Report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON report file path
    pub json_output: Option<PathBuf>,
    /// Pretty-print the JSON report
    #[serde(default = "default_json_pretty")]
    pub json_pretty: bool,
    /// Print a text summary to stderr
    #[serde(default)]
    pub summary: bool,
}

fn default_json_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_output: None,
            json_pretty: default_json_pretty(),
            summary: false,
        }
    }
}

/// Log verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Runtime behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Compare pipeline output with the sequential reference instead of
    /// writing it
    #[serde(default)]
    pub verify: bool,
    /// Log verbosity (RUST_LOG takes precedence)
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Config {
    /// Pipeline settings derived from this configuration
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let gen = &self.generator;
        PipelineConfig {
            line_width: gen.line_width,
            chunk_lines: gen.chunk_lines,
            slots: gen.pool_slots,
            consumer_threads: gen.consumer_threads.unwrap_or_else(num_cpus::get),
        }
    }
}

// Display trait implementations

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Generator: {}", self.generator)?;
        writeln!(f, "  Output: {}", self.output)?;
        writeln!(f, "  Runtime: {}", self.runtime)?;
        Ok(())
    }
}

impl fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={}, seed={}, line_width={}, chunk_lines={}, slots={}",
            self.length, self.seed, self.line_width, self.chunk_lines, self.pool_slots
        )?;
        match self.consumer_threads {
            Some(threads) => write!(f, ", threads={}", threads),
            None => write!(f, ", threads=auto"),
        }
    }
}

impl fmt::Display for OutputConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.json_output {
            Some(path) => write!(f, "json={}", path.display())?,
            None => write!(f, "json=none")?,
        }
        write!(f, ", summary={}", self.summary)
    }
}

impl fmt::Display for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "verify={}, log_level={}", self.verify, self.log_level.as_directive())
    }
}
