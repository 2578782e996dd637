//! Ordered writer and reassembly
//!
//! Consumers finish in whatever order the scheduler allows. The writer puts
//! their output back into block order before it reaches the sink.
//!
//! # State Machine
//!
//! - **Draining**: the ready block is the next one to write. Emit it, release
//!   its write permit, then keep emitting while the following block is waiting
//!   in the deferred set.
//! - **Buffering**: the ready block is ahead of the next one to write. Park it
//!   in the deferred set and return.
//!
//! All writer state lives in one `Writer` value driven from a single thread,
//! so `next_to_write` and the deferred set need no lock.
//!
//! # Deferred Set
//!
//! At most one block per slot can be in flight, because a slot's next cycle
//! cannot format until this cycle's output has been written. The deferred set
//! is therefore a slot-indexed array, like a receive window indexed by
//! sequence number modulo window size.

use super::FormattedBlock;
use crate::error::{FastaError, FastaResult};
use crate::util::buffer::{BlockIndex, BufferPool};
use crossbeam::channel::Receiver;
use std::io::Write;

/// Blocks completed ahead of their turn, indexed by slot
#[derive(Debug)]
pub struct DeferredSet {
    entries: Vec<Option<FormattedBlock>>,
    mask: usize,
    len: usize,
}

impl DeferredSet {
    /// Create an empty set for a pool of `slots` (a power of two)
    pub fn new(slots: usize) -> Self {
        debug_assert!(slots.is_power_of_two());
        Self {
            entries: (0..slots).map(|_| None).collect(),
            mask: slots - 1,
            len: 0,
        }
    }

    /// Park `block` until its turn
    ///
    /// # Panics
    /// Panics if another block is already parked for the same slot, which
    /// would mean the write permit hand-off was bypassed.
    pub fn insert(&mut self, block: FormattedBlock) {
        let idx = block.slot & self.mask;
        let entry = &mut self.entries[idx];
        assert!(
            entry.is_none(),
            "slot {} already holds a deferred block (incoming block {})",
            idx,
            block.block
        );
        *entry = Some(block);
        self.len += 1;
    }

    /// Remove and return `block` if it is parked
    pub fn take(&mut self, block: BlockIndex) -> Option<FormattedBlock> {
        let entry = &mut self.entries[(block as usize) & self.mask];
        match entry {
            Some(parked) if parked.block == block => {
                self.len -= 1;
                entry.take()
            }
            _ => None,
        }
    }

    /// Whether `block` is parked
    pub fn contains(&self, block: BlockIndex) -> bool {
        matches!(&self.entries[(block as usize) & self.mask], Some(parked) if parked.block == block)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Writer-owned progress state for one run
#[derive(Debug)]
pub struct PipelineState {
    /// Symbols not yet emitted
    pub remaining_symbols: u64,
    /// Next block the sink expects
    pub next_to_write: BlockIndex,
    /// Blocks completed out of order
    pub deferred: DeferredSet,
}

/// Counters collected by the writer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterReport {
    pub blocks_written: u64,
    pub symbols_written: u64,
    pub bytes_written: u64,
    /// Blocks that arrived before their predecessor
    pub out_of_order: u64,
    /// Largest deferred-set size seen
    pub peak_deferred: usize,
}

/// Single ordered writer for one pipeline run
pub struct Writer<'a, W: Write + ?Sized> {
    pool: &'a BufferPool,
    sink: &'a mut W,
    state: PipelineState,
    report: WriterReport,
    error: Option<std::io::Error>,
}

impl<'a, W: Write + ?Sized> Writer<'a, W> {
    /// Create a writer expecting `total_symbols` symbols starting at block 0
    pub fn new(pool: &'a BufferPool, sink: &'a mut W, total_symbols: u64) -> Self {
        Self {
            pool,
            sink,
            state: PipelineState {
                remaining_symbols: total_symbols,
                next_to_write: 0,
                deferred: DeferredSet::new(pool.slot_count()),
            },
            report: WriterReport::default(),
            error: None,
        }
    }

    /// Handle a formatted block that is ready to emit
    pub fn on_ready(&mut self, block: FormattedBlock) {
        if block.block != self.state.next_to_write {
            tracing::trace!(
                block = block.block,
                next = self.state.next_to_write,
                "Deferring out-of-order block"
            );
            self.report.out_of_order += 1;
            self.state.deferred.insert(block);
            self.report.peak_deferred = self.report.peak_deferred.max(self.state.deferred.len());
            return;
        }

        self.emit(block);
        while let Some(parked) = self.state.deferred.take(self.state.next_to_write) {
            tracing::trace!(block = parked.block, "Draining deferred block");
            self.emit(parked);
        }
    }

    fn emit(&mut self, block: FormattedBlock) {
        if self.error.is_none() {
            if let Err(e) = self.sink.write_all(block.output.as_slice()) {
                tracing::warn!(block = block.block, error = %e, "Output write failed, discarding remaining output");
                self.error = Some(e);
            } else {
                self.report.bytes_written += block.output.len() as u64;
            }
        }

        self.report.blocks_written += 1;
        self.report.symbols_written += block.symbols as u64;
        self.state.remaining_symbols = self.state.remaining_symbols.saturating_sub(block.symbols as u64);
        self.state.next_to_write += 1;

        // Permits are released even after a write error so consumers never stall
        self.pool.slot(block.slot).write.release(block.output);
    }

    /// Current progress state
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Drive the writer from `ready` until every consumer has hung up
    pub fn run(mut self, ready: Receiver<FormattedBlock>) -> FastaResult<WriterReport> {
        for block in ready.iter() {
            self.on_ready(block);
        }
        self.finish()
    }

    /// Flush the sink and check that every block was emitted
    pub fn finish(mut self) -> FastaResult<WriterReport> {
        if let Some(e) = self.error.take() {
            return Err(FastaError::Io(e));
        }
        self.sink.flush()?;

        if !self.state.deferred.is_empty() || self.state.remaining_symbols != 0 {
            return Err(FastaError::StageDisconnected("consumer"));
        }
        Ok(self.report)
    }
}
