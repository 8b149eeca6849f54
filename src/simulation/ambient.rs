use glam::Vec2;
use rand::Rng;

use crate::config::{AMBIENT_CYCLE_MS, AMBIENT_FLOAT_AMPLITUDE, PALETTE_LOW, PARTICLE_MAX_SIZE, PARTICLE_MIN_SIZE};

/// One keyframed dot: everything it draws is a function of the clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientDot {
    /// Normalized anchor in [0, 1]²
    pub anchor: Vec2,
    /// Cycle offset in [0, 1)
    pub phase: f32,
    /// Cycle length multiplier so dots drift apart
    pub tempo: f32,
    pub size: f32,
    pub color: [f32; 4],
}

/// Drawn state of a dot at some time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientSample {
    pub position: Vec2,
    pub size: f32,
    pub color: [f32; 4],
    pub opacity: f32,
}

/// Low-tier decoration: looping float/pulse keyframes with no integrated
/// state. The clock only advances while playback is open, like a paused
/// CSS animation.
pub struct AmbientDots {
    dots: Vec<AmbientDot>,
    clock_ms: f64,
}

impl AmbientDots {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let dots = (0..count)
            .map(|_| AmbientDot {
                anchor: Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)),
                phase: rng.gen_range(0.0..1.0),
                tempo: rng.gen_range(0.7..1.3),
                size: rng.gen_range(PARTICLE_MIN_SIZE..PARTICLE_MAX_SIZE) * 1.5,
                color: PALETTE_LOW[rng.gen_range(0..PALETTE_LOW.len())],
            })
            .collect();
        Self { dots, clock_ms: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn step(&mut self, should_animate: bool, delta_ms: f64) {
        if should_animate && delta_ms > 0.0 {
            self.clock_ms += delta_ms;
        }
    }

    pub fn sample(&self, width: f32, height: f32) -> impl Iterator<Item = AmbientSample> + '_ {
        let clock = self.clock_ms;
        self.dots.iter().map(move |dot| {
            let cycle = ((clock / (AMBIENT_CYCLE_MS * dot.tempo as f64)) as f32 + dot.phase).fract();
            let wave = (cycle * std::f32::consts::TAU).sin();
            AmbientSample {
                position: Vec2::new(
                    dot.anchor.x * width,
                    dot.anchor.y * height - wave * AMBIENT_FLOAT_AMPLITUDE,
                ),
                size: dot.size,
                color: dot.color,
                opacity: 0.25 + 0.35 * (0.5 + 0.5 * wave),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::init_rng;

    #[test]
    fn test_samples_repeat_after_full_cycle() {
        let mut rng = init_rng(Some(3));
        let mut dots = AmbientDots::new(1, &mut rng);
        dots.dots[0].tempo = 1.0;
        let first: Vec<_> = dots.sample(800.0, 600.0).collect();
        dots.step(true, AMBIENT_CYCLE_MS);
        let second: Vec<_> = dots.sample(800.0, 600.0).collect();
        assert!((first[0].position - second[0].position).length() < 1e-3);
    }

    #[test]
    fn test_clock_holds_while_gated() {
        let mut rng = init_rng(Some(3));
        let mut dots = AmbientDots::new(8, &mut rng);
        dots.step(false, 500.0);
        assert_eq!(dots.clock_ms(), 0.0);
        dots.step(true, 16.0);
        assert_eq!(dots.clock_ms(), 16.0);
    }

    #[test]
    fn test_float_stays_within_amplitude() {
        let mut rng = init_rng(Some(9));
        let mut dots = AmbientDots::new(16, &mut rng);
        for _ in 0..50 {
            dots.step(true, 333.0);
            for (dot, sample) in dots.dots.iter().zip(dots.sample(800.0, 600.0)) {
                let rest = dot.anchor.y * 600.0;
                assert!((sample.position.y - rest).abs() <= AMBIENT_FLOAT_AMPLITUDE + 1e-3);
                assert!(sample.opacity > 0.0 && sample.opacity <= 0.6 + 1e-6);
            }
        }
    }
}
