//! Seedable random source shared by generators and the spanning-tree loop sampler.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

/// Uniform random numbers as consumed by the generation core.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Uniform integer in `[lo, hi)`. Returns `lo` when the range is empty.
    fn range(&mut self, lo: i32, hi: i32) -> i32;

    fn chance(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }

    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        let upper = i32::try_from(len).unwrap_or(i32::MAX);
        self.range(0, upper) as usize
    }
}

/// ChaCha8-backed generator, seeded once per generation run.
#[derive(Clone, Debug)]
pub struct MapRng {
    rng: ChaCha8Rng,
}

impl MapRng {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl RandomSource for MapRng {
    fn uniform(&mut self) -> f64 {
        // 53 random mantissa bits.
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    fn range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (i64::from(hi) - i64::from(lo)) as u64;
        let offset = self.rng.next_u64() % span;
        (i64::from(lo) + offset as i64) as i32
    }
}

/// Mixes a run seed with a stream id so each algorithm draws from an independent sequence.
pub fn derive_seed(run_seed: u64, stream: u64) -> u64 {
    let mut mixed = run_seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}
