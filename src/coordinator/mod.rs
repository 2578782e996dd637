//! Pipeline coordinator
//!
//! Splits a run into buffer-sized chunks, drives the producer on the calling
//! thread, and runs the consumer pool and the ordered writer as scoped
//! threads that all borrow one `BufferPool`.
//!
//! # Example
//!
//! ```
//! use fastagen::coordinator::{Pipeline, PipelineConfig};
//! use fastagen::distribution::alphabet::HOMO_SAPIENS;
//! use fastagen::distribution::lcg::Lcg;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let mut rng = Lcg::new();
//! let mut out = Vec::new();
//! let summary = pipeline.run(&mut rng, 125, &HOMO_SAPIENS, &mut out).unwrap();
//!
//! assert_eq!(summary.symbols, 125);
//! assert_eq!(out.len(), 125 + 3);
//! ```

pub mod benchmark;

use crate::distribution::weighted::{SymbolEntry, ThresholdTable};
use crate::distribution::RandomSource;
use crate::error::{FastaError, FastaResult};
use crate::stats::RunSummary;
use crate::util::buffer::{BlockIndex, BufferPool, MAX_SLOTS};
use crate::worker::writer::Writer;
use crate::worker::{produce, run_consumer, FormattedBlock, ProducedBlock};
use crossbeam::channel;
use std::io::Write;

/// Default symbols per output line
pub const DEFAULT_LINE_WIDTH: usize = 60;
/// Default lines per chunk
pub const DEFAULT_CHUNK_LINES: usize = 1024;
/// Default pool depth
pub const DEFAULT_SLOTS: usize = 4;

/// Geometry and parallelism of a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Symbols per output line
    pub line_width: usize,
    /// Lines per chunk (chunk size = `chunk_lines * line_width`)
    pub chunk_lines: usize,
    /// Buffer pool depth, a power of two
    pub slots: usize,
    /// Consumer worker threads
    pub consumer_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            chunk_lines: DEFAULT_CHUNK_LINES,
            slots: DEFAULT_SLOTS,
            consumer_threads: num_cpus::get(),
        }
    }
}

impl PipelineConfig {
    /// Symbols per chunk
    pub fn chunk_symbols(&self) -> FastaResult<usize> {
        self.chunk_lines
            .checked_mul(self.line_width)
            .ok_or_else(|| FastaError::config("chunk size overflows"))
    }

    /// Check geometry before any buffer is allocated
    pub fn validate(&self) -> FastaResult<()> {
        if self.line_width == 0 {
            return Err(FastaError::config("line width must be greater than 0"));
        }
        if self.chunk_lines == 0 {
            return Err(FastaError::config("chunk lines must be greater than 0"));
        }
        if self.slots == 0 || !self.slots.is_power_of_two() {
            return Err(FastaError::config(format!(
                "pool size must be a non-zero power of two, got {}",
                self.slots
            )));
        }
        if self.slots > MAX_SLOTS {
            return Err(FastaError::config(format!(
                "pool size {} exceeds maximum of {}",
                self.slots, MAX_SLOTS
            )));
        }
        if self.consumer_threads == 0 {
            return Err(FastaError::config("consumer threads must be at least 1"));
        }
        self.chunk_symbols()?;
        Ok(())
    }
}

/// Chunk schedule of a run: `(block, symbols)` pairs in block order
///
/// Every chunk is full except possibly the last, which carries the remainder.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    remaining: usize,
    chunk: usize,
    next_block: BlockIndex,
}

impl ChunkPlan {
    pub fn new(total_symbols: usize, chunk_symbols: usize) -> Self {
        assert!(chunk_symbols > 0, "chunk size must be greater than 0");
        Self {
            remaining: total_symbols,
            chunk: chunk_symbols,
            next_block: 0,
        }
    }
}

impl Iterator for ChunkPlan {
    type Item = (BlockIndex, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let count = self.remaining.min(self.chunk);
        let block = self.next_block;
        self.remaining -= count;
        self.next_block += 1;
        Some((block, count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.div_ceil(self.chunk);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ChunkPlan {}

/// Concurrent generation pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting invalid geometry
    pub fn new(config: PipelineConfig) -> FastaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate `total_symbols` symbols drawn from `alphabet` into `sink`
    ///
    /// The source is advanced exactly `total_symbols` times, in block order,
    /// so consecutive runs sharing a source continue one stream.
    pub fn run<R, W>(
        &self,
        rng: &mut R,
        total_symbols: usize,
        alphabet: &[SymbolEntry],
        sink: &mut W,
    ) -> FastaResult<RunSummary>
    where
        R: RandomSource + ?Sized,
        W: Write + Send + ?Sized,
    {
        let table = ThresholdTable::build(alphabet, rng.modulus())?;
        self.run_with_table(rng, total_symbols, &table, sink)
    }

    /// Same as `run` with a prebuilt threshold table
    pub fn run_with_table<R, W>(
        &self,
        rng: &mut R,
        total_symbols: usize,
        table: &ThresholdTable,
        sink: &mut W,
    ) -> FastaResult<RunSummary>
    where
        R: RandomSource + ?Sized,
        W: Write + Send + ?Sized,
    {
        let pool = self.allocate_pool()?;
        self.run_in_pool(&pool, rng, total_symbols, table, sink)
    }

    /// Allocate a buffer pool sized for this pipeline's geometry
    pub fn allocate_pool(&self) -> FastaResult<BufferPool> {
        BufferPool::allocate(
            self.config.slots,
            self.config.chunk_symbols()?,
            self.config.line_width,
        )
    }

    /// Run on a pool from `allocate_pool`, leaving it idle for the next run
    ///
    /// Callers that must not emit anything unless every buffer exists
    /// allocate once up front and share the pool across runs.
    pub fn run_in_pool<R, W>(
        &self,
        pool: &BufferPool,
        rng: &mut R,
        total_symbols: usize,
        table: &ThresholdTable,
        sink: &mut W,
    ) -> FastaResult<RunSummary>
    where
        R: RandomSource + ?Sized,
        W: Write + Send + ?Sized,
    {
        if pool.slot_count() != self.config.slots || pool.line_width() != self.config.line_width {
            return Err(FastaError::config("buffer pool does not match pipeline geometry"));
        }
        debug_assert!(pool.is_idle());

        let plan = ChunkPlan::new(total_symbols, pool.chunk_symbols());
        let chunks = plan.len();
        let threads = self.config.consumer_threads;

        tracing::debug!(
            total_symbols,
            chunks,
            chunk_symbols = pool.chunk_symbols(),
            slots = pool.slot_count(),
            threads,
            "Starting pipeline run"
        );

        let (job_tx, job_rx) = channel::bounded::<ProducedBlock>(pool.slot_count());
        let (ready_tx, ready_rx) = channel::bounded::<FormattedBlock>(pool.slot_count());

        let report = std::thread::scope(|scope| {
            let writer = Writer::new(pool, sink, total_symbols as u64);
            let writer_handle = scope.spawn(move || writer.run(ready_rx));

            for _ in 0..threads {
                let jobs = job_rx.clone();
                let ready = ready_tx.clone();
                scope.spawn(move || run_consumer(pool, table, jobs, ready));
            }
            // Only the workers hold these now, so the channels close when they exit
            drop(job_rx);
            drop(ready_tx);

            let mut dispatched = Ok(());
            for (block, count) in plan {
                let produced = produce(pool, block, count, rng);
                if job_tx.send(produced).is_err() {
                    dispatched = Err(FastaError::StageDisconnected("consumer pool"));
                    break;
                }
            }
            drop(job_tx);

            let written = writer_handle
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            dispatched.and(written)
        })?;

        debug_assert!(pool.is_idle());
        tracing::debug!(
            blocks = report.blocks_written,
            bytes = report.bytes_written,
            out_of_order = report.out_of_order,
            peak_deferred = report.peak_deferred,
            "Pipeline run complete"
        );

        Ok(RunSummary {
            symbols: report.symbols_written,
            bytes: report.bytes_written,
            chunks: chunks as u64,
            slots: pool.slot_count(),
            consumer_threads: threads,
            out_of_order: report.out_of_order,
            peak_deferred: report.peak_deferred,
        })
    }
}
