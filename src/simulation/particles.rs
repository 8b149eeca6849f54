use glam::Vec2;
use rand::Rng;

use super::{pcg_hash, unit_from_hash};
use crate::config::{
    ATTRACTION_STRENGTH, INTERACTION_RADIUS, LINK_RADIUS, MAX_LINKS_PER_PARTICLE, PALETTE_HIGH,
    PALETTE_LOW, PALETTE_MEDIUM, PARTICLE_COUNT_HIGH, PARTICLE_COUNT_LOW, PARTICLE_COUNT_MEDIUM,
    PARTICLE_MAX_LIFE, PARTICLE_MAX_OPACITY, PARTICLE_MAX_SIZE, PARTICLE_MAX_SPEED, PARTICLE_MIN_LIFE,
    PARTICLE_MIN_OPACITY, PARTICLE_MIN_SIZE,
};
use crate::policy::PerformanceTier;

/// Speed cap so pointer attraction cannot accelerate particles without bound
const SPEED_LIMIT: f32 = PARTICLE_MAX_SPEED * 4.0;

/// A 2D point mass. Recycled in place when its life runs out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: [f32; 4],
    /// Peak opacity for the current life, re-rolled on recycle
    pub opacity: f32,
    pub life: f32,
    pub max_life: f32,
    /// Per-particle hash state for deterministic re-rolls
    pub seed: u32,
}

impl Particle {
    /// Triangular envelope: fades in, peaks mid-life, fades out
    pub fn display_opacity(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        let phase = self.life / self.max_life;
        (self.opacity * (1.0 - (phase - 0.5).abs() * 2.0)).max(0.0)
    }

    fn recycle(&mut self) {
        self.life = 0.0;
        self.seed = pcg_hash(self.seed);
        self.opacity =
            PARTICLE_MIN_OPACITY + unit_from_hash(self.seed) * (PARTICLE_MAX_OPACITY - PARTICLE_MIN_OPACITY);
    }
}

/// A proximity link between two particle indices
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    /// 1 - dist / radius
    pub strength: f32,
}

/// Fixed per-tier parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    pub palette: &'static [[f32; 4]],
    /// Pointer attraction, top tier only
    pub attract: bool,
}

impl ParticleConfig {
    pub fn for_tier(tier: PerformanceTier) -> Self {
        match tier {
            PerformanceTier::High => Self {
                count: PARTICLE_COUNT_HIGH,
                palette: &PALETTE_HIGH,
                attract: true,
            },
            PerformanceTier::Medium => Self {
                count: PARTICLE_COUNT_MEDIUM,
                palette: &PALETTE_MEDIUM,
                attract: false,
            },
            PerformanceTier::Low => Self {
                count: PARTICLE_COUNT_LOW,
                palette: &PALETTE_LOW,
                attract: false,
            },
            PerformanceTier::Minimal => Self {
                count: 0,
                palette: &PALETTE_LOW,
                attract: false,
            },
        }
    }
}

/// Canvas-tier particle field
pub struct ParticleSystem {
    particles: Vec<Particle>,
    attract: bool,
    width: f32,
    height: f32,
    link_counts: Vec<usize>,
}

impl ParticleSystem {
    pub fn new<R: Rng>(config: &ParticleConfig, width: f32, height: f32, rng: &mut R) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let particles = (0..config.count)
            .map(|_| {
                let max_life = rng.gen_range(PARTICLE_MIN_LIFE..PARTICLE_MAX_LIFE);
                Particle {
                    x: rng.gen_range(0.0..width),
                    y: rng.gen_range(0.0..height),
                    vx: rng.gen_range(-PARTICLE_MAX_SPEED..PARTICLE_MAX_SPEED),
                    vy: rng.gen_range(-PARTICLE_MAX_SPEED..PARTICLE_MAX_SPEED),
                    size: rng.gen_range(PARTICLE_MIN_SIZE..PARTICLE_MAX_SIZE),
                    color: config.palette[rng.gen_range(0..config.palette.len())],
                    opacity: rng.gen_range(PARTICLE_MIN_OPACITY..PARTICLE_MAX_OPACITY),
                    // Random phase so the field does not pulse in unison
                    life: rng.gen_range(0.0..max_life),
                    max_life,
                    seed: rng.gen(),
                }
            })
            .collect::<Vec<_>>();

        Self {
            link_counts: vec![0; particles.len()],
            particles,
            attract: config.attract,
            width,
            height,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Zero or negative sizes keep the previous bounds
    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.width = width;
            self.height = height;
        }
    }

    pub fn step(&mut self, should_animate: bool, pointer: Option<Vec2>) {
        if !should_animate {
            return;
        }

        let (width, height) = (self.width, self.height);
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;

            if self.attract {
                if let Some(pointer) = pointer {
                    let dx = pointer.x - p.x;
                    let dy = pointer.y - p.y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist > 0.0 && dist < INTERACTION_RADIUS {
                        let force = (INTERACTION_RADIUS - dist) / INTERACTION_RADIUS;
                        p.vx += dx / dist * force * ATTRACTION_STRENGTH;
                        p.vy += dy / dist * force * ATTRACTION_STRENGTH;

                        let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
                        if speed > SPEED_LIMIT {
                            p.vx *= SPEED_LIMIT / speed;
                            p.vy *= SPEED_LIMIT / speed;
                        }
                    }
                }
            }

            if p.x < 0.0 {
                p.x = width;
            } else if p.x > width {
                p.x = 0.0;
            }
            if p.y < 0.0 {
                p.y = height;
            } else if p.y > height {
                p.y = 0.0;
            }

            p.life += 1.0;
            if p.life > p.max_life {
                p.recycle();
            }
        }
    }

    /// Proximity links, forward scan only. No particle takes part in more
    /// than `MAX_LINKS_PER_PARTICLE` links.
    pub fn links(&mut self, out: &mut Vec<Link>) {
        out.clear();
        self.link_counts.iter_mut().for_each(|c| *c = 0);
        let radius_sq = LINK_RADIUS * LINK_RADIUS;

        for i in 0..self.particles.len() {
            if self.link_counts[i] >= MAX_LINKS_PER_PARTICLE {
                continue;
            }
            let a = self.particles[i];
            for j in (i + 1)..self.particles.len() {
                if self.link_counts[i] >= MAX_LINKS_PER_PARTICLE {
                    break;
                }
                if self.link_counts[j] >= MAX_LINKS_PER_PARTICLE {
                    continue;
                }
                let b = &self.particles[j];
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq < radius_sq {
                    out.push(Link {
                        a: i,
                        b: j,
                        strength: 1.0 - dist_sq.sqrt() / LINK_RADIUS,
                    });
                    self.link_counts[i] += 1;
                    self.link_counts[j] += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::init_rng;

    fn system(tier: PerformanceTier) -> ParticleSystem {
        let mut rng = init_rng(Some(42));
        ParticleSystem::new(&ParticleConfig::for_tier(tier), 800.0, 600.0, &mut rng)
    }

    #[test]
    fn test_counts_per_tier() {
        assert_eq!(system(PerformanceTier::High).len(), PARTICLE_COUNT_HIGH);
        assert_eq!(system(PerformanceTier::Medium).len(), PARTICLE_COUNT_MEDIUM);
        assert!(system(PerformanceTier::Minimal).is_empty());
    }

    #[test]
    fn test_recycle_resets_life_to_zero() {
        let mut sim = system(PerformanceTier::Medium);
        let count = sim.len();
        {
            let p = &mut sim.particles_mut()[3];
            p.life = p.max_life + 5.0;
        }
        sim.step(true, None);
        assert_eq!(sim.particles()[3].life, 0.0);
        assert_eq!(sim.len(), count);
        let opacity = sim.particles()[3].opacity;
        assert!((PARTICLE_MIN_OPACITY..=PARTICLE_MAX_OPACITY).contains(&opacity));
    }

    #[test]
    fn test_envelope_peaks_mid_life() {
        let mut p = system(PerformanceTier::Medium).particles()[0];
        p.opacity = 0.8;
        p.max_life = 100.0;
        p.life = 0.0;
        assert_eq!(p.display_opacity(), 0.0);
        p.life = 50.0;
        assert!((p.display_opacity() - 0.8).abs() < 1e-6);
        p.life = 75.0;
        assert!((p.display_opacity() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_wraps_across_edges() {
        let mut sim = system(PerformanceTier::Medium);
        {
            let p = &mut sim.particles_mut()[0];
            p.x = 799.9;
            p.y = 0.1;
            p.vx = 0.5;
            p.vy = -0.5;
        }
        sim.step(true, None);
        let p = sim.particles()[0];
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 600.0);
    }

    #[test]
    fn test_closed_gate_mutates_nothing() {
        let mut sim = system(PerformanceTier::High);
        let before = sim.particles().to_vec();
        sim.step(false, Some(Vec2::new(400.0, 300.0)));
        assert_eq!(sim.particles(), &before[..]);
    }

    #[test]
    fn test_evolution_is_deterministic() {
        let mut a = system(PerformanceTier::High);
        let mut b = system(PerformanceTier::High);
        for frame in 0..700 {
            let pointer = Some(Vec2::new(frame as f32, 300.0));
            a.step(true, pointer);
            b.step(true, pointer);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_attraction_only_on_top_tier() {
        let pointer = Some(Vec2::new(100.0, 100.0));
        for (tier, expect_pull) in [(PerformanceTier::High, true), (PerformanceTier::Medium, false)] {
            let mut sim = system(tier);
            {
                let p = &mut sim.particles_mut()[0];
                p.x = 150.0;
                p.y = 100.0;
                p.vx = 0.0;
                p.vy = 0.0;
            }
            sim.step(true, pointer);
            let pulled = sim.particles()[0].vx < 0.0;
            assert_eq!(pulled, expect_pull, "{}", tier);
        }
    }

    #[test]
    fn test_link_cap() {
        let mut sim = system(PerformanceTier::High);
        // Pile everything into one spot so every pair is in range
        for (i, p) in sim.particles_mut().iter_mut().enumerate() {
            p.x = 400.0 + (i % 5) as f32;
            p.y = 300.0 + (i / 5) as f32 * 0.5;
        }
        let mut links = Vec::new();
        sim.links(&mut links);
        assert!(!links.is_empty());

        let mut per_particle = vec![0usize; sim.len()];
        for link in &links {
            per_particle[link.a] += 1;
            per_particle[link.b] += 1;
            assert!(link.strength > 0.0 && link.strength <= 1.0);
        }
        assert!(per_particle.iter().all(|&c| c <= MAX_LINKS_PER_PARTICLE));
    }

    #[test]
    fn test_distant_particles_do_not_link() {
        let mut sim = system(PerformanceTier::Medium);
        for (i, p) in sim.particles_mut().iter_mut().enumerate() {
            p.x = i as f32 * (LINK_RADIUS + 1.0);
            p.y = 0.0;
        }
        let mut links = Vec::new();
        sim.links(&mut links);
        assert!(links.is_empty());
    }
}
