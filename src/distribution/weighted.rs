//! Weighted symbol sampler
//!
//! Maps a uniformly distributed integer onto a symbol according to a fixed
//! cumulative-probability table.
//!
//! # Table Layout
//!
//! The table always has 16 threshold slots regardless of alphabet size. Real
//! entries hold `trunc(cumulative_probability * modulus)`, the last real
//! entry holds the modulus itself, and trailing padding holds `u32::MAX`.
//! Because thresholds are non-decreasing, the index of the first threshold
//! strictly greater than a value equals the number of thresholds less than
//! or equal to it. `sample` computes that count over four 4-wide lanes,
//! which the compiler turns into packed compares.
//!
//! # Example
//!
//! ```
//! use fastagen::distribution::weighted::{SymbolEntry, ThresholdTable};
//!
//! let alphabet = [
//!     SymbolEntry::new(0.3, b'a'),
//!     SymbolEntry::new(0.2, b'c'),
//!     SymbolEntry::new(0.2, b'g'),
//!     SymbolEntry::new(0.3, b't'),
//! ];
//! let table = ThresholdTable::build(&alphabet, 139968).unwrap();
//! assert_eq!(table.sample(0), b'a');
//! assert_eq!(table.sample(41990), b'c');
//! assert_eq!(table.sample(139967), b't');
//! ```

use crate::error::{FastaError, FastaResult};

/// Number of threshold slots in every table
pub const TABLE_SLOTS: usize = 16;

/// Threshold value used for unused trailing slots
pub const PADDING_THRESHOLD: u32 = u32::MAX;

const LANE_WIDTH: usize = 4;

/// One weighted symbol of an alphabet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolEntry {
    /// Probability of emitting this symbol
    pub probability: f64,
    /// Output byte
    pub symbol: u8,
}

impl SymbolEntry {
    pub const fn new(probability: f64, symbol: u8) -> Self {
        Self { probability, symbol }
    }
}

/// Cumulative thresholds for an alphabet of at most 16 symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    thresholds: [u32; TABLE_SLOTS],
    symbols: [u8; TABLE_SLOTS],
    len: usize,
    modulus: u32,
}

impl ThresholdTable {
    /// Build the threshold table for `alphabet` scaled by `modulus`
    ///
    /// Fails with a configuration error if the alphabet is empty, has more
    /// than 16 entries, carries a negative or non-finite probability, or if
    /// the modulus is zero.
    pub fn build(alphabet: &[SymbolEntry], modulus: u32) -> FastaResult<Self> {
        if alphabet.is_empty() {
            return Err(FastaError::config("alphabet must contain at least one symbol"));
        }
        if alphabet.len() > TABLE_SLOTS {
            return Err(FastaError::config(format!(
                "alphabet has {} symbols, at most {} are supported",
                alphabet.len(),
                TABLE_SLOTS
            )));
        }
        if modulus == 0 {
            return Err(FastaError::config("sampler modulus must be non-zero"));
        }

        let mut thresholds = [PADDING_THRESHOLD; TABLE_SLOTS];
        let mut symbols = [0u8; TABLE_SLOTS];
        let mut acc = 0.0f64;

        for (i, entry) in alphabet.iter().enumerate() {
            if !entry.probability.is_finite() || entry.probability < 0.0 {
                return Err(FastaError::config(format!(
                    "symbol '{}' has invalid probability {}",
                    entry.symbol.escape_ascii(),
                    entry.probability
                )));
            }
            acc += entry.probability;
            // Clamped so an over-unity sum cannot break monotonicity
            thresholds[i] = ((acc * f64::from(modulus)) as u32).min(modulus);
            symbols[i] = entry.symbol;
        }

        // Sentinel: every value in [0, modulus) resolves to a real symbol
        thresholds[alphabet.len() - 1] = modulus;

        Ok(Self {
            thresholds,
            symbols,
            len: alphabet.len(),
            modulus,
        })
    }

    /// Return the symbol for `value`
    #[inline(always)]
    pub fn sample(&self, value: u32) -> u8 {
        self.symbols[self.sample_index(value)]
    }

    /// Return the table index chosen for `value`
    ///
    /// This is the smallest `i` with `value < thresholds[i]`. Values at or
    /// beyond the modulus resolve to the last real entry.
    #[inline(always)]
    pub fn sample_index(&self, value: u32) -> usize {
        let mut count = 0usize;
        for lane in self.thresholds.chunks_exact(LANE_WIDTH) {
            count += lane.iter().map(|&t| usize::from(t <= value)).sum::<usize>();
        }
        count.min(self.len - 1)
    }

    /// Reference linear scan, kept for cross-checking the lane search
    #[doc(hidden)]
    pub fn sample_index_linear(&self, value: u32) -> usize {
        self.thresholds[..self.len]
            .iter()
            .position(|&t| value < t)
            .unwrap_or(self.len - 1)
    }

    /// All 16 thresholds including padding
    pub fn thresholds(&self) -> &[u32; TABLE_SLOTS] {
        &self.thresholds
    }

    /// Symbols of the real entries
    pub fn symbols(&self) -> &[u8] {
        &self.symbols[..self.len]
    }

    /// Number of real entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn modulus(&self) -> u32 {
        self.modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::alphabet::{HOMO_SAPIENS, IUB};
    use crate::distribution::lcg::IM;

    fn acgt() -> Vec<SymbolEntry> {
        vec![
            SymbolEntry::new(0.3, b'a'),
            SymbolEntry::new(0.2, b'c'),
            SymbolEntry::new(0.2, b'g'),
            SymbolEntry::new(0.3, b't'),
        ]
    }

    #[test]
    fn test_reference_thresholds() {
        let table = ThresholdTable::build(&acgt(), IM).unwrap();
        assert_eq!(&table.thresholds()[..4], &[41990, 69984, 97977, 139968]);
        for &t in &table.thresholds()[4..] {
            assert_eq!(t, PADDING_THRESHOLD);
        }
    }

    #[test]
    fn test_sample_boundaries() {
        let table = ThresholdTable::build(&acgt(), IM).unwrap();
        assert_eq!(table.sample(0), b'a');
        assert_eq!(table.sample(41989), b'a');
        // Strict less-than: the boundary belongs to the next bucket
        assert_eq!(table.sample(41990), b'c');
        assert_eq!(table.sample(69984), b'g');
        assert_eq!(table.sample(139967), b't');
    }

    #[test]
    fn test_out_of_range_resolves_to_last_symbol() {
        let table = ThresholdTable::build(&acgt(), IM).unwrap();
        assert_eq!(table.sample_index(IM), 3);
        assert_eq!(table.sample_index(u32::MAX), 3);
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let err = ThresholdTable::build(&[], IM).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_seventeen_symbols_rejected() {
        let alphabet: Vec<_> = (0..17).map(|i| SymbolEntry::new(1.0 / 17.0, b'A' + i)).collect();
        let err = ThresholdTable::build(&alphabet, IM).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_sixteen_symbols_accepted() {
        let alphabet: Vec<_> = (0..16).map(|i| SymbolEntry::new(1.0 / 16.0, b'A' + i)).collect();
        let table = ThresholdTable::build(&alphabet, IM).unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(table.thresholds()[15], IM);
        assert_eq!(table.sample(IM - 1), b'P');
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let alphabet = [SymbolEntry::new(f64::NAN, b'a')];
        assert!(ThresholdTable::build(&alphabet, IM).is_err());

        let alphabet = [SymbolEntry::new(-0.1, b'a'), SymbolEntry::new(1.1, b'c')];
        assert!(ThresholdTable::build(&alphabet, IM).is_err());
    }

    #[test]
    fn test_zero_modulus_rejected() {
        assert!(ThresholdTable::build(&acgt(), 0).is_err());
    }

    #[test]
    fn test_thresholds_non_decreasing_when_sum_exceeds_one() {
        let alphabet = [
            SymbolEntry::new(0.8, b'a'),
            SymbolEntry::new(0.8, b'c'),
            SymbolEntry::new(0.1, b'g'),
        ];
        let table = ThresholdTable::build(&alphabet, IM).unwrap();
        let real = &table.thresholds()[..3];
        assert!(real.windows(2).all(|w| w[0] <= w[1]));
        // 'g' is unreachable, everything past 'a' lands on 'c'
        assert_eq!(table.sample(IM - 1), b'c');
    }

    #[test]
    fn test_lane_search_matches_linear_scan() {
        for alphabet in [&IUB[..], &HOMO_SAPIENS[..], &acgt()[..]] {
            let table = ThresholdTable::build(alphabet, IM).unwrap();
            for value in (0..IM).step_by(7) {
                assert_eq!(table.sample_index(value), table.sample_index_linear(value));
            }
        }
    }

    #[test]
    fn test_single_symbol_alphabet() {
        let table = ThresholdTable::build(&[SymbolEntry::new(1.0, b'x')], IM).unwrap();
        assert_eq!(table.sample(0), b'x');
        assert_eq!(table.sample(IM - 1), b'x');
        assert_eq!(table.symbols(), b"x");
    }
}
