use glam::{Quat, Vec2, Vec3};
use rand::Rng;

use super::globe::{fibonacci_sphere, project_point, ProjectedPoint};
use crate::config::{MORPH_DAMPING, MORPH_SHAPE_DURATION_MS, MORPH_SPRING};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphShape {
    Sphere,
    Cube,
    Torus,
    Helix,
    Wave,
}

impl MorphShape {
    pub const SEQUENCE: [MorphShape; 5] = [
        MorphShape::Sphere,
        MorphShape::Cube,
        MorphShape::Torus,
        MorphShape::Helix,
        MorphShape::Wave,
    ];

    /// Deterministic target cloud of `count` points, roughly unit sized
    pub fn target(self, count: usize) -> Vec<Vec3> {
        match self {
            MorphShape::Sphere => fibonacci_sphere(count),
            MorphShape::Cube => cube_surface(count),
            MorphShape::Torus => torus(count),
            MorphShape::Helix => double_helix(count),
            MorphShape::Wave => wave_sheet(count),
        }
    }
}

fn cube_surface(count: usize) -> Vec<Vec3> {
    let per_face = count.div_ceil(6).max(1);
    let side = ((per_face as f32).sqrt().ceil() as usize).max(2);
    let step = 2.0 / (side - 1) as f32;
    (0..count)
        .map(|i| {
            let face = i % 6;
            let k = i / 6;
            let u = (k % side) as f32 * step - 1.0;
            let v = ((k / side) % side) as f32 * step - 1.0;
            let p = match face {
                0 => Vec3::new(1.0, u, v),
                1 => Vec3::new(-1.0, u, v),
                2 => Vec3::new(u, 1.0, v),
                3 => Vec3::new(u, -1.0, v),
                4 => Vec3::new(u, v, 1.0),
                _ => Vec3::new(u, v, -1.0),
            };
            p * 0.75
        })
        .collect()
}

fn torus(count: usize) -> Vec<Vec3> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5f32.sqrt());
    let (major, minor) = (0.7, 0.28);
    (0..count)
        .map(|i| {
            let a = i as f32 / count as f32 * std::f32::consts::TAU;
            let b = golden_angle * i as f32;
            let ring = major + minor * b.cos();
            Vec3::new(ring * a.cos(), minor * b.sin(), ring * a.sin())
        })
        .collect()
}

fn double_helix(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let strand = (i % 2) as f32;
            let t = (i / 2) as f32 / (count / 2).max(1) as f32;
            let angle = t * std::f32::consts::TAU * 3.0 + strand * std::f32::consts::PI;
            Vec3::new(angle.cos() * 0.5, t * 2.2 - 1.1, angle.sin() * 0.5)
        })
        .collect()
}

fn wave_sheet(count: usize) -> Vec<Vec3> {
    let side = ((count as f32).sqrt().ceil() as usize).max(2);
    let step = 2.0 / (side - 1) as f32;
    (0..count)
        .map(|i| {
            let x = (i % side) as f32 * step - 1.0;
            let z = ((i / side) % side) as f32 * step - 1.0;
            Vec3::new(x, 0.25 * (3.0 * x).sin() * (3.0 * z).cos(), z)
        })
        .collect()
}

/// Cubic ease-in-out on [0, 1]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Point cloud spring-interpolating through the shape sequence
pub struct MorphCloud {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    targets: Vec<Vec<Vec3>>,
    elapsed_ms: f64,
    spin: f32,
}

impl MorphCloud {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();
        Self {
            positions,
            velocities: vec![Vec3::ZERO; count],
            targets: MorphShape::SEQUENCE.iter().map(|s| s.target(count)).collect(),
            elapsed_ms: 0.0,
            spin: 0.0,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn cycle(&self) -> (usize, f32) {
        let shape_count = MorphShape::SEQUENCE.len();
        let index = (self.elapsed_ms / MORPH_SHAPE_DURATION_MS).floor() as usize % shape_count;
        let local = (self.elapsed_ms % MORPH_SHAPE_DURATION_MS) / MORPH_SHAPE_DURATION_MS;
        (index, local as f32)
    }

    pub fn current_shape(&self) -> MorphShape {
        MorphShape::SEQUENCE[self.cycle().0]
    }

    pub fn step(&mut self, should_animate: bool, delta_ms: f64) {
        if !should_animate {
            return;
        }
        if delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
            self.spin = (self.spin + delta_ms as f32 * 0.0003).rem_euclid(std::f32::consts::TAU);
        }

        let (index, local) = self.cycle();
        let next = (index + 1) % self.targets.len();
        let blend = ease_in_out_cubic(local);
        let (current, upcoming) = (&self.targets[index], &self.targets[next]);

        for ((pos, vel), (a, b)) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(current.iter().zip(upcoming))
        {
            let target = a.lerp(*b, blend);
            *vel = (*vel + (target - *pos) * MORPH_SPRING) * MORPH_DAMPING;
            *pos += *vel;
        }
    }

    pub fn project(&self, center: Vec2, radius: f32) -> impl Iterator<Item = ProjectedPoint> + '_ {
        let rotation = Quat::from_rotation_y(self.spin) * Quat::from_rotation_x(0.3);
        self.positions
            .iter()
            .map(move |&p| project_point(p, rotation, center, radius))
    }
}
