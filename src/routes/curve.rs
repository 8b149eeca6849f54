use glam::Vec2;

use super::{city, CityNode, RouteDefinition, ROUTES};
use crate::config::{HEADING_DELTA, ROUTE_CURVATURE, ROUTE_SAMPLE_POINTS};

/// A route sampled into pixel space. `points` always holds
/// `ROUTE_SAMPLE_POINTS` entries, whatever the route length.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRoute {
    pub definition: &'static RouteDefinition,
    pub points: Vec<Vec2>,
}

impl ResolvedRoute {
    pub fn point_at(&self, progress: f32) -> Vec2 {
        point_at_progress(&self.points, progress)
    }

    pub fn heading_at(&self, progress: f32) -> f32 {
        heading_at_progress(&self.points, progress)
    }
}

/// Normalized city position to padded pixel space
pub fn project(city: &CityNode, width: f32, height: f32, padding: f32) -> Vec2 {
    Vec2::new(
        padding + city.x * (width - 2.0 * padding),
        padding + city.y * (height - 2.0 * padding),
    )
}

/// Control points at one and two thirds of the chord, pushed perpendicular
/// to it by `curvature × chord length`. The bulge always points up-screen.
pub fn route_control_points(start: Vec2, end: Vec2, curvature: f32) -> (Vec2, Vec2) {
    let chord = end - start;
    let distance = chord.length();
    let mut normal = if distance > 0.0 {
        Vec2::new(-chord.y, chord.x) / distance
    } else {
        Vec2::ZERO
    };
    if normal.y > 0.0 {
        normal = -normal;
    }
    let offset = normal * curvature * distance;
    (start + chord / 3.0 + offset, start + chord * (2.0 / 3.0) + offset)
}

/// Direct polynomial evaluation; exact at t = 0 and t = 1
pub fn cubic_bezier(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    p0 * (mt * mt * mt) + c1 * (3.0 * mt * mt * t) + c2 * (3.0 * mt * t * t) + p3 * (t * t * t)
}

fn sample_curve(start: Vec2, end: Vec2) -> Vec<Vec2> {
    let (c1, c2) = route_control_points(start, end, ROUTE_CURVATURE);
    let last = (ROUTE_SAMPLE_POINTS - 1) as f32;
    (0..ROUTE_SAMPLE_POINTS)
        .map(|i| cubic_bezier(start, c1, c2, end, i as f32 / last))
        .collect()
}

/// Sample every static route against the container.
///
/// Returns None for zero or negative dimensions so callers can keep their
/// previous sampling. Routes with unknown endpoints are skipped.
pub fn resolve_routes(width: f32, height: f32, padding: f32) -> Option<Vec<ResolvedRoute>> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }

    let resolved = ROUTES
        .iter()
        .filter_map(|definition| {
            let from = city(definition.from_city_id)?;
            let to = city(definition.to_city_id)?;
            let start = project(from, width, height, padding);
            let end = project(to, width, height, padding);
            Some(ResolvedRoute {
                definition,
                points: sample_curve(start, end),
            })
        })
        .collect();
    Some(resolved)
}

/// O(1) lookup: clamp, map to a fractional index, interpolate the two
/// bracketing samples.
pub fn point_at_progress(points: &[Vec2], progress: f32) -> Vec2 {
    match points.len() {
        0 => return Vec2::ZERO,
        1 => return points[0],
        _ => {}
    }

    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let position = p * (points.len() - 1) as f32;
    let index = position.floor() as usize;
    if index >= points.len() - 1 {
        return points[points.len() - 1];
    }
    let frac = position - index as f32;
    points[index].lerp(points[index + 1], frac)
}

/// Heading in radians from a central difference around `progress`
pub fn heading_at_progress(points: &[Vec2], progress: f32) -> f32 {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let behind = point_at_progress(points, p - HEADING_DELTA);
    let ahead = point_at_progress(points, p + HEADING_DELTA);
    let delta = ahead - behind;
    delta.y.atan2(delta.x)
}

/// Resolved routes for the current container. Resizes to an empty or
/// negative area keep the previous sampling.
pub struct RouteMap {
    routes: Vec<ResolvedRoute>,
    padding: f32,
    size: (f32, f32),
}

impl RouteMap {
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        let mut map = Self {
            routes: Vec::new(),
            padding,
            size: (0.0, 0.0),
        };
        map.resize(width, height);
        map
    }

    /// Returns true when the sampling was recomputed
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        match resolve_routes(width, height, self.padding) {
            Some(routes) => {
                self.routes = routes;
                self.size = (width, height);
                true
            }
            None => false,
        }
    }

    pub fn routes(&self) -> &[ResolvedRoute] {
        &self.routes
    }

    pub fn route(&self, id: &str) -> Option<&ResolvedRoute> {
        self.routes.iter().find(|route| route.definition.id == id)
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    /// False until the map has been laid out against a non-empty area
    pub fn is_sampled(&self) -> bool {
        !self.routes.is_empty()
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }
}
