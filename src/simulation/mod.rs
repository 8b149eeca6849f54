//! Per-frame simulations. Randomness is confined to construction; every
//! `step` is a deterministic function of prior state, the pointer, and the
//! playback gate.

pub mod ambient;
pub mod fluid;
pub mod globe;
pub mod morph;
pub mod particles;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub use ambient::AmbientDots;
pub use fluid::{FieldImage, FluidCell, FluidField};
pub use globe::{GlobeScene, ProjectedPoint};
pub use morph::{MorphCloud, MorphShape};
pub use particles::{Link, Particle, ParticleConfig, ParticleSystem};

/// Rng for initialization: seeded when reproducibility is wanted
pub fn init_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// PCG hash, used for per-particle deterministic re-rolls
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28).wrapping_add(4))) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}

/// Map a hash to [0, 1)
pub fn unit_from_hash(hash: u32) -> f32 {
    (hash >> 8) as f32 / (1u32 << 24) as f32
}

/// Frame-time floor: skips work (the caller still reschedules) when less
/// than `floor_ms` has passed since the last accepted frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameThrottle {
    floor_ms: f64,
    last_ms: Option<f64>,
}

impl FrameThrottle {
    pub fn new(floor_ms: f64) -> Self {
        Self {
            floor_ms,
            last_ms: None,
        }
    }

    /// No floor at all
    pub fn unlimited() -> Self {
        Self::new(0.0)
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.floor_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}
