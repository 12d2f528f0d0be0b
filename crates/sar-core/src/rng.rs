//! Seeded randomness for patrols, landing offsets and crowd spawning.
//!
//! Every agent owns an [`AgentRng`] whose seed is the run seed XOR-ed with
//! `agent_id * 0x9e37_79b9_7f4a_7c15` (the golden-ratio fraction), so agent
//! streams are independent of each other and of tick interleaving.  Setup
//! code draws from a single [`SimRng`].
//!
//! Both wrap `SmallRng` and share the geometric samplers below.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Vec3};

const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Area-uniform point in the horizontal disk of radius `r` around `center`.
fn disk_point(rng: &mut SmallRng, center: Vec3, r: f32) -> Vec3 {
    if r <= 0.0 {
        return center;
    }
    let bearing = rng.gen_range(0.0f32..std::f32::consts::TAU);
    let dist = r * rng.r#gen::<f32>().sqrt();
    center + Vec3::new(bearing.cos(), 0.0, bearing.sin()) * dist
}

/// Point at a random bearing whose horizontal distance from `target` lies in
/// `[min, max)`; exactly `min` when the band is empty.
fn ring_point(rng: &mut SmallRng, target: Vec3, min: f32, max: f32) -> Vec3 {
    let bearing = rng.gen_range(0.0f32..std::f32::consts::TAU);
    let dist = if max > min { rng.gen_range(min..max) } else { min };
    target + Vec3::new(bearing.cos(), 0.0, bearing.sin()) * dist
}

macro_rules! samplers {
    ($name:ident) => {
        impl $name {
            /// Uniform draw from `range`.
            #[inline]
            pub fn gen_range<T, R>(&mut self, range: R) -> T
            where
                T: rand::distributions::uniform::SampleUniform,
                R: rand::distributions::uniform::SampleRange<T>,
            {
                self.0.gen_range(range)
            }

            /// Bernoulli draw; `p` is clamped into `[0, 1]`.
            #[inline]
            pub fn gen_bool(&mut self, p: f64) -> bool {
                self.0.gen_bool(p.clamp(0.0, 1.0))
            }

            /// Uniform point in the horizontal disk of radius `r`, at
            /// `center.y`.
            pub fn point_in_disk(&mut self, center: Vec3, r: f32) -> Vec3 {
                disk_point(&mut self.0, center, r)
            }

            /// Random point on the `[min, max)` ring around `target`.
            pub fn ring_offset(&mut self, target: Vec3, min: f32, max: f32) -> Vec3 {
                ring_point(&mut self.0, target, min, max)
            }
        }
    };
}

/// One agent's random stream.
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ u64::from(agent.0).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }
}

samplers!(AgentRng);

/// Random stream for single-threaded setup (pool shuffling, crowd placement).
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }
}

samplers!(SimRng);
