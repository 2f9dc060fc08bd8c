//! Seeded randomness for scenario construction and randomized tests.
//!
//! The per-tick pipeline is deterministic; randomness only enters through
//! spawn jitter and test sweeps, so one stream per scenario is enough.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::geo::Vec2;

/// Scenario RNG.  The same seed always lays out the same scene.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T: SampleUniform, R: SampleRange<T>>(&mut self, range: R) -> T {
        self.0.gen_range(range)
    }

    /// Uniform offset in the box `[-half, half]²`; zero for `half <= 0`.
    pub fn jitter(&mut self, half: f64) -> Vec2 {
        if !(half > 0.0) {
            return Vec2::ZERO;
        }
        Vec2::new(self.0.gen_range(-half..=half), self.0.gen_range(-half..=half))
    }
}
