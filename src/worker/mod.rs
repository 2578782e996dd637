//! Pipeline stages
//!
//! This module implements the three stage roles that cycle a pool slot:
//! the producer fills a slot's random buffer, a consumer samples and formats
//! it into the slot's output buffer, and the writer emits output buffers in
//! block order.
//!
//! # Ownership
//!
//! Buffers travel between stages by move. The producer takes the random
//! buffer out of the slot's production permit and sends it to a consumer
//! inside a `ProducedBlock`. The consumer takes the formatted buffer out of
//! the write permit, returns the random buffer to the production permit and
//! sends the formatted buffer to the writer inside a `FormattedBlock`. The
//! writer returns it to the write permit once emitted.
//!
//! # Consumers
//!
//! Consumers run on a fixed pool of threads fed FIFO from one channel. A
//! consumer only waits on the write permit of its own slot, which is freed
//! by the writer once every earlier block has been emitted, so the oldest
//! outstanding job can always make progress regardless of thread count.

pub mod writer;

use crate::distribution::weighted::ThresholdTable;
use crate::distribution::RandomSource;
use crate::util::buffer::{formatted_len, BlockIndex, BufferPool, FormattedBuffer, RandomBuffer};
use crossbeam::channel::{Receiver, Sender};

/// A filled random buffer travelling from the producer to a consumer
#[derive(Debug)]
pub struct ProducedBlock {
    pub block: BlockIndex,
    pub slot: usize,
    pub random: RandomBuffer,
}

/// A formatted buffer travelling from a consumer to the writer
#[derive(Debug)]
pub struct FormattedBlock {
    pub block: BlockIndex,
    pub slot: usize,
    /// Symbols encoded in `output` (newlines excluded)
    pub symbols: usize,
    pub output: FormattedBuffer,
}

/// Producer stage: fill the random buffer of `block`'s slot
///
/// Blocks only while the slot's production permit is held by an earlier
/// cycle. Writes `count` values, clamped to the buffer capacity.
pub fn produce<R: RandomSource + ?Sized>(
    pool: &BufferPool,
    block: BlockIndex,
    count: usize,
    rng: &mut R,
) -> ProducedBlock {
    let slot = pool.slot_for(block);
    let mut random = pool.slot(slot).production.acquire();
    random.fill_from(rng, count);
    ProducedBlock { block, slot, random }
}

/// Consumer stage: sample and format a produced block
///
/// Waits for the slot's write permit so the previous cycle's output has been
/// emitted, formats into the formatted buffer, then releases the production
/// permit so the next cycle for this slot can begin producing.
pub fn consume(pool: &BufferPool, job: ProducedBlock, table: &ThresholdTable) -> FormattedBlock {
    let ProducedBlock { block, slot, random } = job;
    let slot_ref = pool.slot(slot);

    let mut output = slot_ref.write.acquire();
    format_block(random.as_slice(), table, pool.line_width(), &mut output);
    let symbols = random.len();
    slot_ref.production.release(random);

    FormattedBlock {
        block,
        slot,
        symbols,
        output,
    }
}

/// Map `values` to symbols, wrapping lines at `line_width`
///
/// Each full line and a short trailing line end with `\n`.
pub fn format_block(values: &[u32], table: &ThresholdTable, line_width: usize, out: &mut FormattedBuffer) {
    let dst = out.reset(formatted_len(values.len(), line_width));
    let mut pos = 0;

    for line in values.chunks(line_width) {
        let end = pos + line.len();
        for (byte, &value) in dst[pos..end].iter_mut().zip(line) {
            *byte = table.sample(value);
        }
        dst[end] = b'\n';
        pos = end + 1;
    }

    debug_assert_eq!(pos, dst.len());
}

/// Consumer worker loop
///
/// Runs until the job channel is closed or the writer stops listening.
pub fn run_consumer(
    pool: &BufferPool,
    table: &ThresholdTable,
    jobs: Receiver<ProducedBlock>,
    ready: Sender<FormattedBlock>,
) {
    for job in jobs.iter() {
        let formatted = consume(pool, job, table);
        if ready.send(formatted).is_err() {
            tracing::warn!("Writer disconnected, consumer exiting");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::lcg::{Lcg, IM};
    use crate::distribution::weighted::SymbolEntry;

    fn acgt_table() -> ThresholdTable {
        ThresholdTable::build(
            &[
                SymbolEntry::new(0.3, b'a'),
                SymbolEntry::new(0.2, b'c'),
                SymbolEntry::new(0.2, b'g'),
                SymbolEntry::new(0.3, b't'),
            ],
            IM,
        )
        .unwrap()
    }

    #[test]
    fn test_format_block_full_lines() {
        let pool = BufferPool::allocate(1, 6, 3).unwrap();
        let table = acgt_table();
        let mut out = pool.slot(0).write.acquire();

        format_block(&[0, 41990, 69984, 139967, 0, 0], &table, 3, &mut out);
        assert_eq!(out.as_slice(), b"acg\ntaa\n");
    }

    #[test]
    fn test_format_block_short_last_line() {
        let pool = BufferPool::allocate(1, 6, 4).unwrap();
        let table = acgt_table();
        let mut out = pool.slot(0).write.acquire();

        format_block(&[0, 0, 0, 0, 139967], &table, 4, &mut out);
        assert_eq!(out.as_slice(), b"aaaa\nt\n");
    }

    #[test]
    fn test_format_block_empty() {
        let pool = BufferPool::allocate(1, 6, 4).unwrap();
        let table = acgt_table();
        let mut out = pool.slot(0).write.acquire();

        format_block(&[], &table, 4, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_produce_consume_handoff() {
        let pool = BufferPool::allocate(2, 10, 5).unwrap();
        let table = acgt_table();
        let mut rng = Lcg::new();

        let produced = produce(&pool, 3, 10, &mut rng);
        assert_eq!(produced.slot, 1);
        assert_eq!(produced.random.len(), 10);
        // Production permit is held until consumption finishes
        assert!(!pool.slot(1).production.is_available());
        assert!(pool.slot(1).write.is_available());

        let formatted = consume(&pool, produced, &table);
        assert_eq!(formatted.block, 3);
        assert_eq!(formatted.symbols, 10);
        assert_eq!(formatted.output.len(), 12);
        assert!(pool.slot(1).production.is_available());
        assert!(!pool.slot(1).write.is_available());

        pool.slot(1).write.release(formatted.output);
        assert!(pool.is_idle());
    }

    #[test]
    fn test_consumer_loop_processes_all_jobs() {
        let pool = BufferPool::allocate(4, 8, 4).unwrap();
        let table = acgt_table();
        let mut rng = Lcg::new();
        let (job_tx, job_rx) = crossbeam::channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam::channel::unbounded();

        for block in 0..4 {
            job_tx.send(produce(&pool, block, 8, &mut rng)).unwrap();
        }
        drop(job_tx);

        run_consumer(&pool, &table, job_rx, ready_tx);

        let done: Vec<FormattedBlock> = ready_rx.iter().collect();
        assert_eq!(done.len(), 4);
        for (i, block) in done.iter().enumerate() {
            assert_eq!(block.block, i as u64);
            assert_eq!(block.output.len(), 10);
        }
    }
}
