use glam::Vec2;

use super::{RouteDefinition, RouteMap};
use crate::config::{PLANE_SPEED, SHIP_SPEED, TRUCK_SPEED};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    Ship,
    Plane,
    Truck,
}

impl TransportKind {
    /// Progress units per millisecond
    pub fn default_speed(self) -> f32 {
        match self {
            TransportKind::Ship => SHIP_SPEED,
            TransportKind::Plane => PLANE_SPEED,
            TransportKind::Truck => TRUCK_SPEED,
        }
    }
}

/// An icon travelling along a route. Progress loops in [0, 1) forever.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportMarker {
    pub id: u32,
    pub kind: TransportKind,
    pub route_id: &'static str,
    pub progress: f32,
    /// Progress units per millisecond
    pub speed: f32,
}

impl TransportMarker {
    /// Advance by `delta_ms`, wrapping on reaching 1
    pub fn advance(&mut self, delta_ms: f32) {
        if !(delta_ms > 0.0) {
            return;
        }
        let next = self.progress + self.speed * delta_ms;
        self.progress = if next >= 1.0 { next.fract() } else { next };
        if !(0.0..1.0).contains(&self.progress) {
            self.progress = 0.0;
        }
    }
}

/// A placed marker ready to draw
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedMarker {
    pub kind: TransportKind,
    pub position: Vec2,
    pub heading: f32,
    pub color: [f32; 4],
}

/// Every transport marker on the map
pub struct TransportFleet {
    markers: Vec<TransportMarker>,
}

impl TransportFleet {
    /// One to three markers per route depending on traffic, evenly phased
    pub fn new(routes: &[RouteDefinition]) -> Self {
        let mut markers = Vec::new();
        let mut next_id = 0;
        for route in routes {
            let count = route.traffic_intensity.fleet_size();
            for slot in 0..count {
                markers.push(TransportMarker {
                    id: next_id,
                    kind: route.transport,
                    route_id: route.id,
                    progress: slot as f32 / count as f32,
                    speed: route.transport.default_speed(),
                });
                next_id += 1;
            }
        }
        Self { markers }
    }

    pub fn markers(&self) -> &[TransportMarker] {
        &self.markers
    }

    pub fn step(&mut self, delta_ms: f32) {
        for marker in &mut self.markers {
            marker.advance(delta_ms);
        }
    }

    pub fn placed<'a>(&'a self, map: &'a RouteMap) -> impl Iterator<Item = PlacedMarker> + 'a {
        self.markers.iter().filter_map(move |marker| {
            let route = map.route(marker.route_id)?;
            Some(PlacedMarker {
                kind: marker.kind,
                position: route.point_at(marker.progress),
                heading: route.heading_at(marker.progress),
                color: route.definition.color,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::ROUTES;

    fn marker(progress: f32, speed: f32) -> TransportMarker {
        TransportMarker {
            id: 0,
            kind: TransportKind::Ship,
            route_id: "shanghai-casablanca",
            progress,
            speed,
        }
    }

    #[test]
    fn test_advance_linear() {
        let mut m = marker(0.5, 0.0003);
        m.advance(1000.0);
        assert!((m.progress - 0.8).abs() < 1e-5, "got {}", m.progress);
    }

    #[test]
    fn test_wraps_below_one() {
        let mut m = marker(0.999, 0.0005);
        m.advance(10.0);
        assert!(m.progress >= 0.0 && m.progress < 0.005, "got {}", m.progress);
    }

    #[test]
    fn test_large_delta_never_reaches_one() {
        for delta in [1.0, 999.0, 2_000.0, 123_456.0] {
            let mut m = marker(0.999, 0.0007);
            m.advance(delta);
            assert!(m.progress >= 0.0 && m.progress < 1.0, "delta {} -> {}", delta, m.progress);
        }
    }

    #[test]
    fn test_non_positive_delta_is_ignored() {
        let mut m = marker(0.3, 0.001);
        m.advance(0.0);
        m.advance(-50.0);
        m.advance(f32::NAN);
        assert_eq!(m.progress, 0.3);
    }

    #[test]
    fn test_fleet_size_follows_traffic() {
        let fleet = TransportFleet::new(&ROUTES);
        let expected: usize = ROUTES.iter().map(|r| r.traffic_intensity.fleet_size()).sum();
        assert_eq!(fleet.markers().len(), expected);
        for marker in fleet.markers() {
            assert!((0.0..1.0).contains(&marker.progress));
        }
    }

    #[test]
    fn test_placed_markers_follow_routes() {
        let map = RouteMap::new(1600.0, 700.0, 60.0);
        let fleet = TransportFleet::new(&ROUTES);
        let placed: Vec<_> = fleet.placed(&map).collect();
        assert_eq!(placed.len(), fleet.markers().len());

        let first = &fleet.markers()[0];
        let route = map.route(first.route_id).unwrap();
        assert_eq!(placed[0].position, route.point_at(first.progress));
    }
}
