//! Seeded random number generators.
//!
//! Nothing in the engine draws from an ambient or thread-local generator:
//!
//! - [`SimRng`] belongs to the driver and is used for scenario setup, such
//!   as scattering agents over a start area.
//! - Each agent owns an [`AgentRng`] seeded from the scene seed and its
//!   handle.  It is touched only in the sequential commit phase (to reshuffle
//!   a `RepeatRandom` route), so the parallel force phase never reads RNG
//!   state and runs stay reproducible with or without threads.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Vector3};

/// 64-bit fractional golden-ratio constant; spreads consecutive handles
/// across the seed space.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-agent generator.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// `seed = scene_seed XOR (agent * MIXING_CONSTANT)`.
    pub fn new(scene_seed: u64, agent: AgentId) -> Self {
        let seed = scene_seed ^ u64::from(agent.0).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Fisher-Yates shuffle in place.
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }
}

/// Scenario-setup generator.  Single-threaded use only.
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Uniform point on the ground plane inside the half-open rectangle
    /// `[min, max)`.  Degenerate extents yield the `min` coordinate.
    pub fn point_in(&mut self, min: (f64, f64), max: (f64, f64)) -> Vector3 {
        let mut axis = |lo: f64, hi: f64| if hi > lo { self.0.gen_range(lo..hi) } else { lo };
        let x = axis(min.0, max.0);
        let y = axis(min.1, max.1);
        Vector3::planar(x, y)
    }
}
