//! Standard-normal variate sources for the Monte Carlo engine.
//!
//! The engine only ever asks for "one more N(0, 1) draw", so anything that can
//! answer that (a seeded PRNG, a recorded sequence, a constant in tests) plugs
//! in through [`NormalSource`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Capability: produce one standard-normal variate.
pub trait NormalSource {
    fn next_standard_normal(&mut self) -> f64;
}

impl<N: NormalSource + ?Sized> NormalSource for &mut N {
    #[inline]
    fn next_standard_normal(&mut self) -> f64 {
        (**self).next_standard_normal()
    }
}

/// Standard-normal draws from any `rand` generator.
#[derive(Debug, Clone)]
pub struct StdNormalSource<R: Rng = StdRng> {
    rng: R,
}

impl<R: Rng> StdNormalSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl StdNormalSource<StdRng> {
    /// Seeded, reproducible source: the same seed always yields the same
    /// sequence of draws.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Private source for one replicate of a seeded run.
    ///
    /// Every replicate gets its own stream derived from `(seed, index)`, so
    /// the set of draws does not depend on how replicates are scheduled
    /// across threads.
    pub fn for_replicate(seed: u64, index: u64) -> Self {
        Self::from_seed(mix_seed(seed, index))
    }
}

impl<R: Rng> NormalSource for StdNormalSource<R> {
    #[inline]
    fn next_standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

// SplitMix64 finaliser over seed + index.
fn mix_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed.wrapping_add(index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
