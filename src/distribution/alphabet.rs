//! Fixed benchmark alphabets
//!
//! The IUB ambiguity codes and the Homo sapiens nucleotide frequencies used
//! by the random sections, and the ALU sequence cycled by the repeat section.

use super::weighted::SymbolEntry;

/// IUB ambiguity codes (15 symbols)
pub const IUB: [SymbolEntry; 15] = [
    SymbolEntry::new(0.27, b'a'),
    SymbolEntry::new(0.12, b'c'),
    SymbolEntry::new(0.12, b'g'),
    SymbolEntry::new(0.27, b't'),
    SymbolEntry::new(0.02, b'B'),
    SymbolEntry::new(0.02, b'D'),
    SymbolEntry::new(0.02, b'H'),
    SymbolEntry::new(0.02, b'K'),
    SymbolEntry::new(0.02, b'M'),
    SymbolEntry::new(0.02, b'N'),
    SymbolEntry::new(0.02, b'R'),
    SymbolEntry::new(0.02, b'S'),
    SymbolEntry::new(0.02, b'V'),
    SymbolEntry::new(0.02, b'W'),
    SymbolEntry::new(0.02, b'Y'),
];

/// Homo sapiens nucleotide frequencies (4 symbols)
pub const HOMO_SAPIENS: [SymbolEntry; 4] = [
    SymbolEntry::new(0.3029549426680, b'a'),
    SymbolEntry::new(0.1979883004921, b'c'),
    SymbolEntry::new(0.1975473066391, b'g'),
    SymbolEntry::new(0.3015094502008, b't'),
];

/// ALU repeat sequence (287 bases)
pub const ALU: &[u8] = b"GGCCGGGCGCGGTGGCTCACGCCTGTAATCCCAGCACTTTGGGAGGCCGAGGCGGGCGGATCACCTGAGGTCAGGAGTTC\
GAGACCAGCCTGGCCAACATGGTGAAACCCCGTCTCTACTAAAAATACAAAAATTAGCCGGGCGTGGTGGCGCGCGCCTG\
TAATCCCAGCTACTCGGGAGGCTGAGGCAGGAGAATCGCTTGAACCCGGGAGGCGGAGGTTGCAGTGAGCCGAGATCGCG\
CCACTGCACTCCAGCCTGGGCGACAGAGCGAGACTCCGTCTCAAAAA";

/// Named alphabet selector used by the benchmark sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphabetKind {
    Iub,
    HomoSapiens,
}

impl AlphabetKind {
    pub fn entries(self) -> &'static [SymbolEntry] {
        match self {
            AlphabetKind::Iub => &IUB,
            AlphabetKind::HomoSapiens => &HOMO_SAPIENS,
        }
    }
}

impl std::fmt::Display for AlphabetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlphabetKind::Iub => write!(f, "iub"),
            AlphabetKind::HomoSapiens => write!(f, "homo_sapiens"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alu_length() {
        assert_eq!(ALU.len(), 287);
        assert!(ALU.iter().all(|b| b"ACGT".contains(b)));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        for kind in [AlphabetKind::Iub, AlphabetKind::HomoSapiens] {
            let sum: f64 = kind.entries().iter().map(|e| e.probability).sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", kind, sum);
        }
    }

    #[test]
    fn test_alphabets_fit_table() {
        assert!(IUB.len() <= 16);
        assert!(HOMO_SAPIENS.len() <= 16);
    }
}
