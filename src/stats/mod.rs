//! Run statistics
//!
//! Counters reported by the pipeline for each run, per-section summaries of a
//! benchmark, and symbol histograms of generated output.

use crate::util::verification::VerificationResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bytes per histogram work unit
const HISTOGRAM_CHUNK: usize = 64 * 1024;

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Symbols emitted (newlines excluded)
    pub symbols: u64,
    /// Bytes written to the sink
    pub bytes: u64,
    /// Chunks dispatched
    pub chunks: u64,
    /// Buffer pool depth
    pub slots: usize,
    /// Consumer worker threads
    pub consumer_threads: usize,
    /// Blocks that finished before their predecessor
    pub out_of_order: u64,
    /// Largest number of blocks waiting in the deferred set at once
    pub peak_deferred: usize,
}

/// Summary of one benchmark section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Section identifier (ONE, TWO, THREE)
    pub id: String,
    /// Header title
    pub title: String,
    /// Symbols emitted (newlines excluded)
    pub symbols: u64,
    /// Bytes written including header and newlines
    pub bytes: u64,
    /// Pipeline counters, absent for the repeat section
    pub pipeline: Option<RunSummary>,
    /// Observed symbol frequencies (verify mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<SymbolHistogram>,
    /// Comparison against the sequential reference (verify mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationResult>,
}

/// Per-byte occurrence counts of generated symbols
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolHistogram {
    counts: Vec<u64>,
    total: u64,
}

impl SymbolHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self {
            counts: vec![0; 256],
            total: 0,
        }
    }

    /// Count every symbol byte in `bytes`, skipping newlines
    ///
    /// Large inputs are split into chunks counted in parallel.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        bytes
            .par_chunks(HISTOGRAM_CHUNK)
            .fold(SymbolHistogram::new, |mut hist, chunk| {
                hist.record(chunk);
                hist
            })
            .reduce(SymbolHistogram::new, |mut a, b| {
                a.merge(&b);
                a
            })
    }

    /// Count symbols in `bytes`
    pub fn record(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b != b'\n' {
                self.counts[b as usize] += 1;
                self.total += 1;
            }
        }
    }

    /// Merge another histogram into this one
    pub fn merge(&mut self, other: &SymbolHistogram) {
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.total += other.total;
    }

    /// Occurrences of `symbol`
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total symbols counted
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Observed frequency of `symbol` (0.0 when empty)
    pub fn frequency(&self, symbol: u8) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(symbol) as f64 / self.total as f64
        }
    }

    /// Symbols seen at least once, with counts, in byte order
    pub fn observed(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(b, &c)| (b as u8, c))
    }
}

impl Default for SymbolHistogram {
    fn default() -> Self {
        Self::new()
    }
}
