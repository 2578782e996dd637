//! Stream verification utilities
//!
//! This module provides the strictly sequential rendition of a random section
//! and a comparison that locates the first divergence between two streams.
//! Together they check that the concurrent pipeline reproduces the sequential
//! output byte for byte.

use crate::distribution::weighted::ThresholdTable;
use crate::distribution::RandomSource;
use rayon::prelude::*;

/// Bytes compared per parallel work unit
const COMPARE_CHUNK: usize = 64 * 1024;

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VerificationResult {
    /// Streams are identical
    Success,
    /// Common prefix matches but lengths differ
    LengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// Streams differ inside the common prefix
    Failure {
        /// Offset of first mismatch
        offset: usize,
        /// Expected value
        expected: u8,
        /// Actual value
        actual: u8,
    },
}

impl VerificationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationResult::Success)
    }
}

impl std::fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationResult::Success => write!(f, "streams match"),
            VerificationResult::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {} bytes, got {}", expected, actual)
            }
            VerificationResult::Failure { offset, expected, actual } => write!(
                f,
                "mismatch at byte {}: expected {:?}, got {:?}",
                offset,
                char::from(*expected),
                char::from(*actual)
            ),
        }
    }
}

/// Generate `total` symbols one at a time on the calling thread
///
/// Produces the same framing as the pipeline: a newline after every
/// `line_width` symbols and after a short final line.
pub fn sequential_reference<R: RandomSource + ?Sized>(
    rng: &mut R,
    total: usize,
    table: &ThresholdTable,
    line_width: usize,
) -> Vec<u8> {
    assert!(line_width > 0, "line width must be greater than 0");
    let mut out = Vec::with_capacity(total + total.div_ceil(line_width));
    let mut column = 0;

    for _ in 0..total {
        out.push(table.sample(rng.next_u32()));
        column += 1;
        if column == line_width {
            out.push(b'\n');
            column = 0;
        }
    }
    if column > 0 {
        out.push(b'\n');
    }
    out
}

/// Compare two streams and report the first difference
///
/// The common prefix is scanned in parallel chunks; the earliest mismatching
/// chunk is then searched sequentially for the exact offset.
pub fn compare_streams(expected: &[u8], actual: &[u8]) -> VerificationResult {
    let common = expected.len().min(actual.len());
    let (expected_prefix, actual_prefix) = (&expected[..common], &actual[..common]);

    let first_bad_chunk = expected_prefix
        .par_chunks(COMPARE_CHUNK)
        .zip(actual_prefix.par_chunks(COMPARE_CHUNK))
        .position_first(|(e, a)| e != a);

    if let Some(chunk) = first_bad_chunk {
        let base = chunk * COMPARE_CHUNK;
        let end = (base + COMPARE_CHUNK).min(common);
        for offset in base..end {
            if expected[offset] != actual[offset] {
                return VerificationResult::Failure {
                    offset,
                    expected: expected[offset],
                    actual: actual[offset],
                };
            }
        }
    }

    if expected.len() != actual.len() {
        return VerificationResult::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        };
    }
    VerificationResult::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::lcg::{Lcg, IM};
    use crate::distribution::weighted::SymbolEntry;

    fn ac_table() -> ThresholdTable {
        ThresholdTable::build(&[SymbolEntry::new(0.5, b'a'), SymbolEntry::new(0.5, b'c')], IM).unwrap()
    }

    #[test]
    fn test_reference_framing() {
        let table = ac_table();
        let out = sequential_reference(&mut Lcg::new(), 7, &table, 3);
        assert_eq!(out.len(), 10);
        assert_eq!(out[3], b'\n');
        assert_eq!(out[7], b'\n');
        assert_eq!(out[9], b'\n');

        let out = sequential_reference(&mut Lcg::new(), 6, &table, 3);
        assert_eq!(out.len(), 8);
        assert!(!out.ends_with(b"\n\n"));
    }

    #[test]
    fn test_reference_first_symbol() {
        // 52439 < 69984, so the first symbol is 'a'
        let out = sequential_reference(&mut Lcg::new(), 1, &ac_table(), 60);
        assert_eq!(out, b"a\n");
    }

    #[test]
    fn test_compare_identical() {
        let data = vec![b'a'; 200_000];
        assert_eq!(compare_streams(&data, &data), VerificationResult::Success);
        assert_eq!(compare_streams(&[], &[]), VerificationResult::Success);
    }

    #[test]
    fn test_compare_finds_first_mismatch() {
        let expected = vec![b'a'; 200_000];
        let mut actual = expected.clone();
        actual[150_001] = b'c';
        actual[199_999] = b'g';

        match compare_streams(&expected, &actual) {
            VerificationResult::Failure { offset, expected, actual } => {
                assert_eq!(offset, 150_001);
                assert_eq!(expected, b'a');
                assert_eq!(actual, b'c');
            }
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_compare_length_mismatch() {
        let result = compare_streams(b"acgt\n", b"acgt\nac");
        assert_eq!(
            result,
            VerificationResult::LengthMismatch {
                expected: 5,
                actual: 7
            }
        );
        assert!(!result.is_success());
        assert!(result.to_string().contains("expected 5 bytes"));
    }
}
