//! fastagen - concurrent FASTA random sequence generator
//!
//! Generates the classical three-section FASTA benchmark output with a
//! multi-stage pipeline whose bytes are identical to a strictly sequential
//! generator.
//!
//! # Architecture
//!
//! - **Random source**: linear congruential generator, advanced strictly in
//!   block order by a single producer
//! - **Weighted sampler**: 16-slot threshold table searched in four lanes
//! - **Buffer pool**: power-of-two ring of slots guarded by production and
//!   write permits
//! - **Consumers**: worker threads that sample and frame blocks in parallel
//! - **Ordered writer**: reassembles completed blocks into block order

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod error;
pub mod output;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::benchmark::Benchmark;
pub use coordinator::{Pipeline, PipelineConfig};
pub use error::{FastaError, FastaResult};

/// Result type used by the binary and configuration layer
pub type Result<T> = anyhow::Result<T>;
