//! Static shipping network: city nodes and the routes between them.

mod curve;
mod transport;

pub use curve::{
    cubic_bezier, heading_at_progress, point_at_progress, project, resolve_routes, route_control_points,
    ResolvedRoute, RouteMap,
};
pub use transport::{PlacedMarker, TransportFleet, TransportKind, TransportMarker};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Origin,
    Hub,
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrafficIntensity {
    Low,
    Medium,
    High,
}

impl TrafficIntensity {
    /// Transport markers spawned per route
    pub fn fleet_size(self) -> usize {
        match self {
            TrafficIntensity::Low => 1,
            TrafficIntensity::Medium => 2,
            TrafficIntensity::High => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashStyle {
    Solid,
    Dashed,
}

/// A city on the normalized map, position in [0, 1]²
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CityNode {
    pub id: &'static str,
    pub name: &'static str,
    pub x: f32,
    pub y: f32,
    pub region: Region,
    /// Drives marker size and label visibility, in [0, 1]
    pub importance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteDefinition {
    pub id: &'static str,
    pub from_city_id: &'static str,
    pub to_city_id: &'static str,
    pub color: [f32; 4],
    pub width: f32,
    pub dash_style: DashStyle,
    pub traffic_intensity: TrafficIntensity,
    pub transport: TransportKind,
}

const SEA_LANE: [f32; 4] = [0.23, 0.51, 0.96, 0.8];
const AIR_LANE: [f32; 4] = [0.55, 0.36, 0.96, 0.7];
const LAND_LANE: [f32; 4] = [0.96, 0.62, 0.04, 0.7];

pub static CITIES: [CityNode; 10] = [
    CityNode { id: "shanghai", name: "Shanghai", x: 0.82, y: 0.35, region: Region::Origin, importance: 1.0 },
    CityNode { id: "shenzhen", name: "Shenzhen", x: 0.80, y: 0.45, region: Region::Origin, importance: 0.9 },
    CityNode { id: "singapore", name: "Singapore", x: 0.74, y: 0.62, region: Region::Hub, importance: 0.85 },
    CityNode { id: "dubai", name: "Dubai", x: 0.58, y: 0.45, region: Region::Hub, importance: 0.8 },
    CityNode { id: "almaty", name: "Almaty", x: 0.66, y: 0.28, region: Region::Hub, importance: 0.45 },
    CityNode { id: "casablanca", name: "Casablanca", x: 0.38, y: 0.48, region: Region::Hub, importance: 0.6 },
    CityNode { id: "rotterdam", name: "Rotterdam", x: 0.40, y: 0.22, region: Region::Destination, importance: 0.95 },
    CityNode { id: "hamburg", name: "Hamburg", x: 0.43, y: 0.19, region: Region::Destination, importance: 0.7 },
    CityNode { id: "new_york", name: "New York", x: 0.22, y: 0.30, region: Region::Destination, importance: 0.85 },
    CityNode { id: "los_angeles", name: "Los Angeles", x: 0.10, y: 0.38, region: Region::Destination, importance: 0.9 },
];

pub static ROUTES: [RouteDefinition; 10] = [
    RouteDefinition {
        id: "shanghai-casablanca",
        from_city_id: "shanghai",
        to_city_id: "casablanca",
        color: SEA_LANE,
        width: 2.0,
        dash_style: DashStyle::Solid,
        traffic_intensity: TrafficIntensity::Medium,
        transport: TransportKind::Ship,
    },
    RouteDefinition {
        id: "shanghai-rotterdam",
        from_city_id: "shanghai",
        to_city_id: "rotterdam",
        color: SEA_LANE,
        width: 2.5,
        dash_style: DashStyle::Solid,
        traffic_intensity: TrafficIntensity::High,
        transport: TransportKind::Ship,
    },
    RouteDefinition {
        id: "shenzhen-los-angeles",
        from_city_id: "shenzhen",
        to_city_id: "los_angeles",
        color: SEA_LANE,
        width: 2.5,
        dash_style: DashStyle::Solid,
        traffic_intensity: TrafficIntensity::High,
        transport: TransportKind::Ship,
    },
    RouteDefinition {
        id: "singapore-dubai",
        from_city_id: "singapore",
        to_city_id: "dubai",
        color: SEA_LANE,
        width: 2.0,
        dash_style: DashStyle::Solid,
        traffic_intensity: TrafficIntensity::Medium,
        transport: TransportKind::Ship,
    },
    RouteDefinition {
        id: "dubai-rotterdam",
        from_city_id: "dubai",
        to_city_id: "rotterdam",
        color: SEA_LANE,
        width: 2.0,
        dash_style: DashStyle::Solid,
        traffic_intensity: TrafficIntensity::Medium,
        transport: TransportKind::Ship,
    },
    RouteDefinition {
        id: "shanghai-almaty",
        from_city_id: "shanghai",
        to_city_id: "almaty",
        color: LAND_LANE,
        width: 1.5,
        dash_style: DashStyle::Dashed,
        traffic_intensity: TrafficIntensity::Low,
        transport: TransportKind::Truck,
    },
    RouteDefinition {
        id: "almaty-hamburg",
        from_city_id: "almaty",
        to_city_id: "hamburg",
        color: LAND_LANE,
        width: 1.5,
        dash_style: DashStyle::Dashed,
        traffic_intensity: TrafficIntensity::Low,
        transport: TransportKind::Truck,
    },
    RouteDefinition {
        id: "shenzhen-new-york",
        from_city_id: "shenzhen",
        to_city_id: "new_york",
        color: AIR_LANE,
        width: 1.5,
        dash_style: DashStyle::Dashed,
        traffic_intensity: TrafficIntensity::Medium,
        transport: TransportKind::Plane,
    },
    RouteDefinition {
        id: "singapore-hamburg",
        from_city_id: "singapore",
        to_city_id: "hamburg",
        color: AIR_LANE,
        width: 1.5,
        dash_style: DashStyle::Dashed,
        traffic_intensity: TrafficIntensity::Low,
        transport: TransportKind::Plane,
    },
    RouteDefinition {
        id: "dubai-new-york",
        from_city_id: "dubai",
        to_city_id: "new_york",
        color: AIR_LANE,
        width: 1.5,
        dash_style: DashStyle::Dashed,
        traffic_intensity: TrafficIntensity::Low,
        transport: TransportKind::Plane,
    },
];

pub fn city(id: &str) -> Option<&'static CityNode> {
    CITIES.iter().find(|city| city.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_endpoint_exists() {
        for route in &ROUTES {
            assert!(city(route.from_city_id).is_some(), "missing {}", route.from_city_id);
            assert!(city(route.to_city_id).is_some(), "missing {}", route.to_city_id);
        }
    }

    #[test]
    fn test_cities_are_normalized() {
        for city in &CITIES {
            assert!((0.0..=1.0).contains(&city.x) && (0.0..=1.0).contains(&city.y), "{}", city.id);
            assert!((0.0..=1.0).contains(&city.importance), "{}", city.id);
        }
    }

    #[test]
    fn test_route_ids_unique() {
        for (i, a) in ROUTES.iter().enumerate() {
            for b in &ROUTES[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
