//! Buffer pool shared by the pipeline stages
//!
//! This module provides the fixed set of reusable slots that bound memory use
//! and in-flight work for one pipeline run. Each slot pairs a raw random
//! buffer with a formatted output buffer, and each buffer sits behind its own
//! binary permit.
//!
//! # Hand-off Protocol
//!
//! ```text
//! Producer:  acquire production permit  -> fill RandomBuffer
//! Consumer:  acquire write permit       -> format into FormattedBuffer
//!            release production permit  (next cycle may start producing)
//! Writer:    emit FormattedBuffer in block order -> release write permit
//! ```
//!
//! The producer for block `k + slots` cannot start until block `k` has been
//! consumed, and its consumer cannot start until block `k` has been written.

use super::permit::Permit;
use crate::distribution::RandomSource;
use crate::error::{FastaError, FastaResult};

/// Monotonic index assigned to each chunk at production time
pub type BlockIndex = u64;

/// Largest supported pool
pub const MAX_SLOTS: usize = 1024;

/// Fixed-capacity buffer of raw random values
#[derive(Debug)]
pub struct RandomBuffer {
    values: Vec<u32>,
    len: usize,
}

impl RandomBuffer {
    fn allocate(capacity: usize) -> Option<Self> {
        let mut values = Vec::new();
        values.try_reserve_exact(capacity).ok()?;
        values.resize(capacity, 0);
        Some(Self { values, len: 0 })
    }

    /// Overwrite the buffer with `count` fresh values from `rng`
    ///
    /// `count` is clamped to the capacity. Returns the number of values written.
    pub fn fill_from<R: RandomSource + ?Sized>(&mut self, rng: &mut R, count: usize) -> usize {
        let count = count.min(self.values.len());
        rng.fill(&mut self.values[..count]);
        self.len = count;
        count
    }

    /// Values written by the last fill
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.values[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }
}

/// Fixed-capacity buffer of line-wrapped symbol bytes
#[derive(Debug)]
pub struct FormattedBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl FormattedBuffer {
    fn allocate(capacity: usize) -> Option<Self> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(capacity).ok()?;
        bytes.resize(capacity, 0);
        Some(Self { bytes, len: 0 })
    }

    /// Set the content length and return the writable region
    ///
    /// # Panics
    /// Panics if `len` exceeds the capacity.
    #[inline]
    pub fn reset(&mut self, len: usize) -> &mut [u8] {
        assert!(len <= self.bytes.len(), "formatted length {} exceeds capacity {}", len, self.bytes.len());
        self.len = len;
        &mut self.bytes[..len]
    }

    /// Bytes ready to emit
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

/// One reusable unit of the pool
#[derive(Debug)]
pub struct BufferSlot {
    index: usize,
    /// Held by the task allowed to overwrite the random buffer
    pub production: Permit<RandomBuffer>,
    /// Held by the task allowed to hold or emit the formatted buffer
    pub write: Permit<FormattedBuffer>,
}

impl BufferSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether neither permit is currently held
    pub fn is_idle(&self) -> bool {
        self.production.is_available() && self.write.is_available()
    }
}

/// Fixed pool of slots cycled between producer, consumers and writer
///
/// The pool is allocated once per pipeline run and dropped when the run
/// returns, on success and error paths alike.
#[derive(Debug)]
pub struct BufferPool {
    slots: Vec<BufferSlot>,
    mask: usize,
    chunk_symbols: usize,
    line_width: usize,
}

impl BufferPool {
    /// Allocate `slot_count` slots sized for chunks of `chunk_symbols`
    ///
    /// # Arguments
    /// * `slot_count` - Number of slots, a non-zero power of two
    /// * `chunk_symbols` - Capacity of each random buffer
    /// * `line_width` - Symbols per output line, sizes the formatted buffers
    pub fn allocate(slot_count: usize, chunk_symbols: usize, line_width: usize) -> FastaResult<Self> {
        if slot_count == 0 || !slot_count.is_power_of_two() {
            return Err(FastaError::config(format!(
                "pool size must be a non-zero power of two, got {}",
                slot_count
            )));
        }
        if slot_count > MAX_SLOTS {
            return Err(FastaError::config(format!(
                "pool size {} exceeds maximum of {}",
                slot_count, MAX_SLOTS
            )));
        }
        if chunk_symbols == 0 {
            return Err(FastaError::config("chunk size must be greater than 0"));
        }
        if line_width == 0 {
            return Err(FastaError::config("line width must be greater than 0"));
        }

        let formatted_capacity = checked_formatted_len(chunk_symbols, line_width);
        let total_bytes = chunk_symbols
            .checked_mul(std::mem::size_of::<u32>())
            .zip(formatted_capacity)
            .and_then(|(raw, formatted)| raw.checked_add(formatted))
            .and_then(|b| b.checked_mul(slot_count));
        let allocation_failure = || FastaError::Allocation {
            slots: slot_count,
            bytes: total_bytes.unwrap_or(usize::MAX),
        };
        let formatted_capacity = match (formatted_capacity, total_bytes) {
            (Some(formatted), Some(_)) => formatted,
            _ => return Err(allocation_failure()),
        };

        let mut slots = Vec::new();
        slots.try_reserve_exact(slot_count).map_err(|_| allocation_failure())?;
        for index in 0..slot_count {
            let random = RandomBuffer::allocate(chunk_symbols).ok_or_else(allocation_failure)?;
            let formatted = FormattedBuffer::allocate(formatted_capacity).ok_or_else(allocation_failure)?;
            slots.push(BufferSlot {
                index,
                production: Permit::new(random),
                write: Permit::new(formatted),
            });
        }

        Ok(Self {
            slots,
            mask: slot_count - 1,
            chunk_symbols,
            line_width,
        })
    }

    /// Slot used by `block`
    #[inline(always)]
    pub fn slot_for(&self, block: BlockIndex) -> usize {
        (block as usize) & self.mask
    }

    /// Get a slot by index
    ///
    /// # Panics
    /// Panics if the index is out of bounds
    #[inline]
    pub fn slot(&self, index: usize) -> &BufferSlot {
        &self.slots[index]
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Capacity of each random buffer in symbols
    #[inline]
    pub fn chunk_symbols(&self) -> usize {
        self.chunk_symbols
    }

    #[inline]
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Capacity of each formatted buffer in bytes
    pub fn formatted_capacity(&self) -> usize {
        formatted_len(self.chunk_symbols, self.line_width)
    }

    /// Whether every permit in the pool is available
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(BufferSlot::is_idle)
    }
}

/// Bytes needed to line-wrap `symbols` symbols at `line_width`
///
/// Every line, including a short final one, ends with a newline. `symbols`
/// must fit the formatted capacity of an allocated pool.
#[inline]
pub fn formatted_len(symbols: usize, line_width: usize) -> usize {
    symbols + symbols.div_ceil(line_width)
}

/// `formatted_len` for untrusted geometry, `None` on overflow
#[inline]
pub fn checked_formatted_len(symbols: usize, line_width: usize) -> Option<usize> {
    symbols.checked_add(symbols.div_ceil(line_width))
}
