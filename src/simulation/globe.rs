use glam::{Quat, Vec2, Vec3};

use crate::config::{ARC_LIFT, ARC_SAMPLE_POINTS, CAMERA_DISTANCE, GLOBE_POINTS, GLOBE_ROTATION_SPEED};
use crate::routes::{city, CityNode, RouteDefinition};

/// Fixed tilt so the globe reads as a sphere rather than a disc
const GLOBE_TILT: f32 = 0.35;

/// A 3D point after rotation and perspective projection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    pub position: Vec2,
    /// Rotated z in [-1, 1]; positive faces the camera
    pub depth: f32,
    /// Perspective scale factor
    pub scale: f32,
}

/// Equal-area point distribution over the unit sphere (golden-angle spiral
/// with uniform spacing along the axis)
pub fn fibonacci_sphere(count: usize) -> Vec<Vec3> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5f32.sqrt());
    (0..count)
        .map(|i| {
            let y = 1.0 - (i as f32 + 0.5) / count as f32 * 2.0;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f32;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
        })
        .collect()
}

/// Normalized map position to a unit vector (equirectangular)
pub fn city_on_sphere(city: &CityNode) -> Vec3 {
    let lon = (city.x - 0.5) * std::f32::consts::TAU;
    let lat = (0.5 - city.y) * std::f32::consts::PI;
    Vec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos())
}

/// Quadratic Bézier between two surface points, lifted off the sphere in
/// proportion to their chord
pub fn sphere_arc(from: Vec3, to: Vec3, samples: usize) -> Vec<Vec3> {
    let chord = from.distance(to);
    let control = (from + to).try_normalize().unwrap_or(Vec3::Y) * (1.0 + ARC_LIFT * chord);
    let last = samples.saturating_sub(1).max(1) as f32;
    (0..samples)
        .map(|i| {
            let t = i as f32 / last;
            let mt = 1.0 - t;
            from * (mt * mt) + control * (2.0 * mt * t) + to * (t * t)
        })
        .collect()
}

/// Perspective-project a unit-space point into a circle of `radius` pixels
pub fn project_point(point: Vec3, rotation: Quat, center: Vec2, radius: f32) -> ProjectedPoint {
    let p = rotation * point;
    let scale = CAMERA_DISTANCE / (CAMERA_DISTANCE - p.z).max(0.1);
    ProjectedPoint {
        position: center + Vec2::new(p.x, -p.y) * radius * scale,
        depth: p.z,
        scale,
    }
}

/// Rotating point globe with route arcs, top tier only
pub struct GlobeScene {
    points: Vec<Vec3>,
    arcs: Vec<(Vec<Vec3>, [f32; 4])>,
    rotation: f32,
}

impl GlobeScene {
    pub fn new(routes: &[RouteDefinition]) -> Self {
        let arcs = routes
            .iter()
            .filter_map(|route| {
                let from = city_on_sphere(city(route.from_city_id)?);
                let to = city_on_sphere(city(route.to_city_id)?);
                Some((sphere_arc(from, to, ARC_SAMPLE_POINTS), route.color))
            })
            .collect();
        Self {
            points: fibonacci_sphere(GLOBE_POINTS),
            arcs,
            rotation: 0.0,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn step(&mut self, should_animate: bool, delta_ms: f32) {
        if should_animate && delta_ms > 0.0 {
            self.rotation = (self.rotation + GLOBE_ROTATION_SPEED * delta_ms).rem_euclid(std::f32::consts::TAU);
        }
    }

    fn orientation(&self) -> Quat {
        Quat::from_rotation_x(GLOBE_TILT) * Quat::from_rotation_y(self.rotation)
    }

    pub fn project_points(&self, center: Vec2, radius: f32) -> impl Iterator<Item = ProjectedPoint> + '_ {
        let rotation = self.orientation();
        self.points
            .iter()
            .map(move |&p| project_point(p, rotation, center, radius))
    }

    pub fn project_arcs(&self, center: Vec2, radius: f32) -> Vec<(Vec<ProjectedPoint>, [f32; 4])> {
        let rotation = self.orientation();
        self.arcs
            .iter()
            .map(|(arc, color)| {
                let projected = arc
                    .iter()
                    .map(|&p| project_point(p, rotation, center, radius))
                    .collect();
                (projected, *color)
            })
            .collect()
    }
}
