//! Random sources and symbol distributions
//!
//! This module provides the deterministic random stream that drives sequence
//! generation and the weighted sampler that maps each raw value onto an
//! output symbol.
//!
//! # Components
//!
//! - **Lcg**: Linear-congruential generator with a fixed, reproducible stream
//! - **ThresholdTable**: Cumulative-probability lookup over at most 16 symbols
//! - **Alphabets**: The IUB and Homo sapiens tables plus the ALU repeat
//!
//! # Example
//!
//! ```
//! use fastagen::distribution::{RandomSource, lcg::Lcg};
//! use fastagen::distribution::weighted::ThresholdTable;
//! use fastagen::distribution::alphabet::HOMO_SAPIENS;
//!
//! let mut rng = Lcg::new();
//! let table = ThresholdTable::build(&HOMO_SAPIENS, rng.modulus()).unwrap();
//! let symbol = table.sample(rng.next_u32());
//! assert!(b"acgt".contains(&symbol));
//! ```

/// Source of raw uniformly distributed values
///
/// Every value returned by `next_u32` lies in `[0, modulus())`. The weighted
/// sampler scales its thresholds by the same modulus, so the two must agree.
///
/// # Thread Safety
///
/// Sources are `Send` so a caller can hand one to whichever thread drives the
/// producer. They are never shared: exactly one stage advances a source.
pub trait RandomSource: Send {
    /// Advance the source and return the new value
    fn next_u32(&mut self) -> u32;

    /// Exclusive upper bound of generated values
    fn modulus(&self) -> u32;

    /// Fill `buf` with consecutive values
    #[inline]
    fn fill(&mut self, buf: &mut [u32]) {
        for slot in buf.iter_mut() {
            *slot = self.next_u32();
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn modulus(&self) -> u32 {
        (**self).modulus()
    }

    #[inline]
    fn fill(&mut self, buf: &mut [u32]) {
        (**self).fill(buf)
    }
}

pub mod alphabet;
pub mod lcg;
pub mod weighted;
