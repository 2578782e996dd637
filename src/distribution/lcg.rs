//! Linear-congruential random source
//!
//! The classical benchmark generator: `seed = (seed * IA + IC) mod IM`.
//! Output is fully determined by the starting seed, which makes every run
//! reproducible byte for byte.
//!
//! # Example
//!
//! ```
//! use fastagen::distribution::{RandomSource, lcg::Lcg};
//!
//! let mut rng = Lcg::new();
//! assert_eq!(rng.next_u32(), 52439);
//! ```

use super::RandomSource;

/// Modulus of the recurrence
pub const IM: u32 = 139_968;
/// Multiplier of the recurrence
pub const IA: u32 = 3877;
/// Increment of the recurrence
pub const IC: u32 = 29_573;
/// Starting seed of the benchmark stream
pub const DEFAULT_SEED: u32 = 42;

/// Deterministic LCG over stride 139968
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    /// Create a source starting at the benchmark seed (42)
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create a source starting at `seed`
    ///
    /// The seed is reduced modulo `IM` so `seed * IA + IC` always fits in u32.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed: seed % IM }
    }

    /// Current state (the last value returned, or the starting seed)
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for Lcg {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.seed = (self.seed * IA + IC) % IM;
        self.seed
    }

    #[inline(always)]
    fn modulus(&self) -> u32 {
        IM
    }
}
