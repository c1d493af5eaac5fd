//! Gaussian random number sources.
//!
//! Two generators sit behind the [`GaussianSource`] trait: a Mersenne
//! Twister pushed through the inverse normal CDF, and `rand`'s `StdRng`
//! sampled with the Ziggurat `StandardNormal`. Both are seeded explicitly;
//! there is no process-wide generator, so each pricing call owns its stream
//! and repeated calls with the same seed reproduce the same draws.

use lsm_core::Real;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_mt::Mt19937GenRand64;
use serde::{Deserialize, Serialize};

/// A stream of independent standard-normal deviates.
pub trait GaussianSource {
    /// Next standard-normal deviate.
    fn next_gaussian(&mut self) -> Real;

    /// Fill `out` with standard-normal deviates, in order.
    fn fill(&mut self, out: &mut [Real]) {
        for z in out.iter_mut() {
            *z = self.next_gaussian();
        }
    }
}

/// Which generator backs a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// MT19937-64 with inverse-CDF transform.
    #[default]
    MersenneTwister,
    /// `rand::rngs::StdRng` with Ziggurat sampling.
    StdRng,
}

impl GeneratorKind {
    /// Build a seeded source of this kind.
    pub fn make_source(self, seed: u64) -> Box<dyn GaussianSource> {
        match self {
            Self::MersenneTwister => Box::new(InverseCumulativeNormalRng::new(seed)),
            Self::StdRng => Box::new(ZigguratNormalRng::new(seed)),
        }
    }
}

/// A uniform pseudo-random number generator based on MT19937-64.
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Next uniform deviate in `[0, 1)`.
    pub fn next_real(&mut self) -> Real {
        uniform_from_bits(self.rng.next_u64())
    }
}

/// Top 53 bits of `u` as a multiple of `2^-53`, so the result is strictly
/// below 1.
fn uniform_from_bits(u: u64) -> Real {
    (u >> 11) as Real * (1.0 / (1u64 << 53) as Real)
}

/// Standard-normal deviates by inverting the normal CDF on MT19937 uniforms.
pub struct InverseCumulativeNormalRng {
    inner: MersenneTwisterUniformRng,
}

impl InverseCumulativeNormalRng {
    /// Create a new generator backed by a Mersenne Twister with the given
    /// seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: MersenneTwisterUniformRng::new(seed),
        }
    }
}

impl GaussianSource for InverseCumulativeNormalRng {
    fn next_gaussian(&mut self) -> Real {
        // the endpoints map to ±inf
        let u = loop {
            let u = self.inner.next_real();
            if u > 0.0 && u < 1.0 {
                break u;
            }
        };
        crate::distributions::acklam_inverse(u)
    }
}

/// Standard-normal deviates from `StdRng` via the Ziggurat method.
pub struct ZigguratNormalRng {
    inner: StdRng,
}

impl ZigguratNormalRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl GaussianSource for ZigguratNormalRng {
    fn next_gaussian(&mut self) -> Real {
        StandardNormal.sample(&mut self.inner)
    }
}
