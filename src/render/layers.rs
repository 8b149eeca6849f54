use glam::Vec2;
use rand::Rng;

use super::{with_alpha, DrawList, LayerSurface};
use crate::config::{
    CITY_MARKER_MAX_RADIUS, CITY_MARKER_MIN_RADIUS, DASH_FLOW_SPEED, DASH_PATTERN, FLUID_PIXEL_STRIDE,
    FRAME_FLOOR_MS, GLOBE_RADIUS_FRACTION, LABEL_IMPORTANCE_THRESHOLD, LINK_COLOR, MORPH_PARTICLES,
    PARTICLE_COUNT_LOW, ROUTE_PADDING,
};
use crate::policy::{AnimationMode, PerformanceTier};
use crate::routes::{DashStyle, RouteMap, TransportFleet, TransportKind, CITIES, ROUTES};
use crate::simulation::{
    AmbientDots, FieldImage, FluidField, FrameThrottle, GlobeScene, Link, MorphCloud, ParticleConfig,
    ParticleSystem,
};

/// Longest step any clock-driven layer takes after a stall
const MAX_FRAME_DELTA_MS: f64 = 100.0;

/// What every layer sees on a scheduled frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub now_ms: f64,
    pub should_animate: bool,
    pub pointer: Option<Vec2>,
}

/// One independently scheduled simulation drawing to its own surface.
///
/// `frame` is called on every scheduled frame. When the gate is closed (or
/// the layer's own throttle declines) the layer mutates nothing and keeps
/// its previous surface.
pub trait Layer {
    fn name(&self) -> &'static str;
    fn resize(&mut self, width: f32, height: f32);
    fn frame(&mut self, ctx: &FrameContext);
    fn surface(&self) -> &LayerSurface;

    /// Simulated points owned by this layer
    fn particle_count(&self) -> usize {
        0
    }
}

/// Milliseconds since the previous open frame, or None while gated.
/// A closed gate forgets the previous timestamp so resuming never catches up.
fn advance_clock(last_ms: &mut Option<f64>, ctx: &FrameContext) -> Option<f64> {
    if !ctx.should_animate {
        *last_ms = None;
        return None;
    }
    let delta = last_ms
        .map(|last| (ctx.now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS))
        .unwrap_or(0.0);
    *last_ms = Some(ctx.now_ms);
    Some(delta)
}

fn valid_size(width: f32, height: f32) -> bool {
    width > 0.0 && height > 0.0
}

/// Build the layer stack for a mode, bottom to top. Layers for other modes
/// are never constructed.
pub fn compose_layers<R: Rng>(
    mode: AnimationMode,
    tier: PerformanceTier,
    width: f32,
    height: f32,
    rng: &mut R,
) -> Vec<Box<dyn Layer>> {
    match mode {
        AnimationMode::Static => vec![Box::new(RouteLayer::still(width, height))],
        AnimationMode::Css => vec![
            Box::new(AmbientLayer::new(PARTICLE_COUNT_LOW, width, height, rng)),
            Box::new(RouteLayer::animated(width, height)),
        ],
        AnimationMode::Canvas => vec![
            Box::new(FluidLayer::new(tier, width, height)),
            Box::new(ParticleLayer::new(tier, width, height, rng)),
            Box::new(RouteLayer::animated(width, height)),
        ],
        AnimationMode::Webgl => vec![
            Box::new(FluidLayer::new(tier, width, height)),
            Box::new(GlobeLayer::new(width, height)),
            Box::new(MorphLayer::new(width, height, rng)),
            Box::new(ParticleLayer::new(tier, width, height, rng)),
            Box::new(RouteLayer::animated(width, height)),
        ],
    }
}

// ============================================
// Routes, cities and transport markers
// ============================================

const SHIP_GLYPH: [[f32; 2]; 9] = [
    [1.0, 0.0], [0.4, 0.35], [0.4, -0.35],
    [-1.0, -0.35], [0.4, -0.35], [0.4, 0.35],
    [-1.0, -0.35], [0.4, 0.35], [-1.0, 0.35],
];

const PLANE_GLYPH: [[f32; 2]; 9] = [
    [1.0, 0.0], [-0.6, 0.15], [-0.6, -0.15],
    [0.2, 0.0], [-0.3, 0.9], [-0.3, -0.9],
    [-0.5, 0.0], [-0.9, 0.4], [-0.9, -0.4],
];

const TRUCK_GLYPH: [[f32; 2]; 12] = [
    [-1.0, -0.4], [0.3, -0.4], [0.3, 0.4],
    [-1.0, -0.4], [0.3, 0.4], [-1.0, 0.4],
    [0.35, -0.3], [0.8, -0.3], [0.8, 0.3],
    [0.35, -0.3], [0.8, 0.3], [0.35, 0.3],
];

const MARKER_SCALE: f32 = 6.0;

fn glyph_for(kind: TransportKind) -> &'static [[f32; 2]] {
    match kind {
        TransportKind::Ship => &SHIP_GLYPH,
        TransportKind::Plane => &PLANE_GLYPH,
        TransportKind::Truck => &TRUCK_GLYPH,
    }
}

/// Route map with moving transport icons. The still variant is the static
/// fallback image: painted on resize only, never stepped.
pub struct RouteLayer {
    map: RouteMap,
    fleet: TransportFleet,
    dash_offset: f32,
    last_ms: Option<f64>,
    animated: bool,
    surface: LayerSurface,
}

impl RouteLayer {
    pub fn animated(width: f32, height: f32) -> Self {
        Self::build(width, height, true)
    }

    pub fn still(width: f32, height: f32) -> Self {
        Self::build(width, height, false)
    }

    fn build(width: f32, height: f32, animated: bool) -> Self {
        let mut layer = Self {
            map: RouteMap::new(width, height, ROUTE_PADDING),
            fleet: TransportFleet::new(&ROUTES),
            dash_offset: 0.0,
            last_ms: None,
            animated,
            surface: LayerSurface::default(),
        };
        layer.paint();
        layer
    }

    pub fn fleet(&self) -> &TransportFleet {
        &self.fleet
    }

    fn paint(&mut self) {
        let shapes = &mut self.surface.shapes;
        shapes.clear();
        if !self.map.is_sampled() {
            return;
        }

        for route in self.map.routes() {
            let def = route.definition;
            match def.dash_style {
                DashStyle::Solid => shapes.polyline(&route.points, def.width, def.color),
                DashStyle::Dashed => {
                    shapes.dashed_polyline(&route.points, def.width, def.color, DASH_PATTERN, self.dash_offset)
                }
            }
        }

        let (width, height) = self.map.size();
        let padding = self.map.padding();
        for city in &CITIES {
            let center = crate::routes::project(city, width, height, padding);
            let radius =
                CITY_MARKER_MIN_RADIUS + (CITY_MARKER_MAX_RADIUS - CITY_MARKER_MIN_RADIUS) * city.importance;
            if city.importance >= LABEL_IMPORTANCE_THRESHOLD {
                shapes.circle(center, radius * 2.2, [1.0, 1.0, 1.0, 0.12]);
            }
            shapes.circle(center, radius, [0.93, 0.95, 1.0, 0.9]);
        }

        for marker in self.fleet.placed(&self.map) {
            shapes.glyph(glyph_for(marker.kind), marker.position, marker.heading, MARKER_SCALE, marker.color);
        }
    }
}

impl Layer for RouteLayer {
    fn name(&self) -> &'static str {
        if self.animated {
            "routes"
        } else {
            "static-map"
        }
    }

    fn resize(&mut self, width: f32, height: f32) {
        if self.map.resize(width, height) {
            self.paint();
        }
    }

    fn frame(&mut self, ctx: &FrameContext) {
        if !self.animated {
            return;
        }
        let Some(delta) = advance_clock(&mut self.last_ms, ctx) else {
            return;
        };
        self.fleet.step(delta as f32);
        let period = (DASH_PATTERN.0 + DASH_PATTERN.1) as f32;
        self.dash_offset = (self.dash_offset - delta as f32 * DASH_FLOW_SPEED).rem_euclid(period);
        self.paint();
    }

    fn surface(&self) -> &LayerSurface {
        &self.surface
    }
}

// ============================================
// 2D particles
// ============================================

pub struct ParticleLayer {
    system: ParticleSystem,
    throttle: FrameThrottle,
    links: Vec<Link>,
    surface: LayerSurface,
}

impl ParticleLayer {
    pub fn new<R: Rng>(tier: PerformanceTier, width: f32, height: f32, rng: &mut R) -> Self {
        let throttle = if tier == PerformanceTier::Medium {
            FrameThrottle::new(FRAME_FLOOR_MS)
        } else {
            FrameThrottle::unlimited()
        };
        Self {
            system: ParticleSystem::new(&ParticleConfig::for_tier(tier), width, height, rng),
            throttle,
            links: Vec::new(),
            surface: LayerSurface::default(),
        }
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    fn paint(&mut self) {
        let shapes = &mut self.surface.shapes;
        shapes.clear();
        let particles = self.system.particles();
        for link in &self.links {
            let a = &particles[link.a];
            let b = &particles[link.b];
            shapes.line(
                Vec2::new(a.x, a.y),
                Vec2::new(b.x, b.y),
                1.0,
                with_alpha(LINK_COLOR, link.strength),
            );
        }
        for p in particles {
            shapes.circle(Vec2::new(p.x, p.y), p.size, with_alpha(p.color, p.display_opacity()));
        }
    }
}

impl Layer for ParticleLayer {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.system.resize(width, height);
    }

    fn frame(&mut self, ctx: &FrameContext) {
        if !ctx.should_animate || !self.throttle.ready(ctx.now_ms) {
            return;
        }
        self.system.step(true, ctx.pointer);
        self.system.links(&mut self.links);
        self.paint();
    }

    fn surface(&self) -> &LayerSurface {
        &self.surface
    }

    fn particle_count(&self) -> usize {
        self.system.len()
    }
}

// ============================================
// Fluid field
// ============================================

pub struct FluidLayer {
    field: FluidField,
    throttle: FrameThrottle,
    size: (u32, u32),
    surface: LayerSurface,
}

impl FluidLayer {
    pub fn new(tier: PerformanceTier, width: f32, height: f32) -> Self {
        Self {
            field: FluidField::for_tier(tier, width, height),
            throttle: FrameThrottle::new(FRAME_FLOOR_MS),
            size: (width.max(0.0) as u32, height.max(0.0) as u32),
            surface: LayerSurface::default(),
        }
    }

    pub fn field(&self) -> &FluidField {
        &self.field
    }
}

impl Layer for FluidLayer {
    fn name(&self) -> &'static str {
        "fluid"
    }

    fn resize(&mut self, width: f32, height: f32) {
        if self.field.resize(width, height) {
            self.size = (width as u32, height as u32);
        }
    }

    fn frame(&mut self, ctx: &FrameContext) {
        if !ctx.should_animate || !self.throttle.ready(ctx.now_ms) {
            return;
        }
        self.field.step(true, ctx.pointer);
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return;
        }
        let image = self.surface.image.get_or_insert_with(FieldImage::default);
        self.field.paint(width, height, FLUID_PIXEL_STRIDE, ctx.now_ms, image);
    }

    fn surface(&self) -> &LayerSurface {
        &self.surface
    }
}

// ============================================
// CSS-tier ambient dots
// ============================================

pub struct AmbientLayer {
    dots: AmbientDots,
    last_ms: Option<f64>,
    size: (f32, f32),
    surface: LayerSurface,
}

impl AmbientLayer {
    pub fn new<R: Rng>(count: usize, width: f32, height: f32, rng: &mut R) -> Self {
        let mut layer = Self {
            dots: AmbientDots::new(count, rng),
            last_ms: None,
            size: (width, height),
            surface: LayerSurface::default(),
        };
        layer.paint();
        layer
    }

    fn paint(&mut self) {
        let (width, height) = self.size;
        let shapes = &mut self.surface.shapes;
        shapes.clear();
        for dot in self.dots.sample(width, height) {
            shapes.circle(dot.position, dot.size, with_alpha(dot.color, dot.opacity));
        }
    }
}

impl Layer for AmbientLayer {
    fn name(&self) -> &'static str {
        "ambient"
    }

    fn resize(&mut self, width: f32, height: f32) {
        if valid_size(width, height) {
            self.size = (width, height);
            self.paint();
        }
    }

    fn frame(&mut self, ctx: &FrameContext) {
        let Some(delta) = advance_clock(&mut self.last_ms, ctx) else {
            return;
        };
        self.dots.step(true, delta);
        self.paint();
    }

    fn surface(&self) -> &LayerSurface {
        &self.surface
    }

    fn particle_count(&self) -> usize {
        self.dots.len()
    }
}

// ============================================
// Top-tier 3D scene variants
// ============================================

fn scene_radius(width: f32, height: f32, fraction: f32) -> f32 {
    width.min(height) * fraction
}

pub struct GlobeLayer {
    globe: GlobeScene,
    last_ms: Option<f64>,
    size: (f32, f32),
    surface: LayerSurface,
}

impl GlobeLayer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            globe: GlobeScene::new(&ROUTES),
            last_ms: None,
            size: (width, height),
            surface: LayerSurface::default(),
        }
    }

    fn paint(&mut self) {
        let (width, height) = self.size;
        let center = Vec2::new(width * 0.72, height * 0.5);
        let radius = scene_radius(width, height, GLOBE_RADIUS_FRACTION);
        let shapes: &mut DrawList = &mut self.surface.shapes;
        shapes.clear();

        for point in self.globe.project_points(center, radius) {
            let alpha = if point.depth >= 0.0 { 0.25 + 0.55 * point.depth } else { 0.08 };
            shapes.circle(point.position, 1.1 * point.scale, [0.55, 0.75, 1.0, alpha]);
        }

        for (arc, color) in self.globe.project_arcs(center, radius) {
            for pair in arc.windows(2) {
                let depth = (pair[0].depth + pair[1].depth) * 0.5;
                let alpha = if depth >= 0.0 { 0.9 } else { 0.15 };
                shapes.line(pair[0].position, pair[1].position, 1.5, with_alpha(color, alpha));
            }
        }
    }
}

impl Layer for GlobeLayer {
    fn name(&self) -> &'static str {
        "globe"
    }

    fn resize(&mut self, width: f32, height: f32) {
        if valid_size(width, height) {
            self.size = (width, height);
        }
    }

    fn frame(&mut self, ctx: &FrameContext) {
        let Some(delta) = advance_clock(&mut self.last_ms, ctx) else {
            return;
        };
        self.globe.step(true, delta as f32);
        self.paint();
    }

    fn surface(&self) -> &LayerSurface {
        &self.surface
    }

    fn particle_count(&self) -> usize {
        self.globe.point_count()
    }
}

pub struct MorphLayer {
    cloud: MorphCloud,
    last_ms: Option<f64>,
    size: (f32, f32),
    surface: LayerSurface,
}

impl MorphLayer {
    pub fn new<R: Rng>(width: f32, height: f32, rng: &mut R) -> Self {
        Self {
            cloud: MorphCloud::new(MORPH_PARTICLES, rng),
            last_ms: None,
            size: (width, height),
            surface: LayerSurface::default(),
        }
    }

    fn paint(&mut self) {
        let (width, height) = self.size;
        let center = Vec2::new(width * 0.22, height * 0.55);
        let radius = scene_radius(width, height, GLOBE_RADIUS_FRACTION * 0.55);
        let shapes = &mut self.surface.shapes;
        shapes.clear();
        for point in self.cloud.project(center, radius) {
            let alpha = 0.35 + 0.3 * point.depth.clamp(-1.0, 1.0);
            shapes.circle(point.position, 1.3 * point.scale, [0.02, 0.71, 0.83, alpha]);
        }
    }
}

impl Layer for MorphLayer {
    fn name(&self) -> &'static str {
        "morph"
    }

    fn resize(&mut self, width: f32, height: f32) {
        if valid_size(width, height) {
            self.size = (width, height);
        }
    }

    fn frame(&mut self, ctx: &FrameContext) {
        let Some(delta) = advance_clock(&mut self.last_ms, ctx) else {
            return;
        };
        self.cloud.step(true, delta);
        self.paint();
    }

    fn surface(&self) -> &LayerSurface {
        &self.surface
    }

    fn particle_count(&self) -> usize {
        self.cloud.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::init_rng;

    fn ctx(now_ms: f64, should_animate: bool) -> FrameContext {
        FrameContext {
            now_ms,
            should_animate,
            pointer: None,
        }
    }

    fn names(mode: AnimationMode, tier: PerformanceTier) -> Vec<&'static str> {
        let mut rng = init_rng(Some(5));
        compose_layers(mode, tier, 1280.0, 720.0, &mut rng)
            .iter()
            .map(|layer| layer.name())
            .collect()
    }

    #[test]
    fn test_unsized_route_layer_paints_nothing() {
        let mut layer = RouteLayer::animated(0.0, 0.0);
        assert!(layer.surface().shapes.is_empty());
        layer.frame(&ctx(0.0, true));
        layer.frame(&ctx(16.0, true));
        assert!(layer.surface().shapes.is_empty());

        layer.resize(800.0, 400.0);
        assert!(!layer.surface().shapes.is_empty());
    }

    #[test]
    fn test_composition_per_mode() {
        assert_eq!(names(AnimationMode::Static, PerformanceTier::Minimal), ["static-map"]);
        assert_eq!(names(AnimationMode::Css, PerformanceTier::Low), ["ambient", "routes"]);
        assert_eq!(
            names(AnimationMode::Canvas, PerformanceTier::Medium),
            ["fluid", "particles", "routes"]
        );
        assert_eq!(
            names(AnimationMode::Webgl, PerformanceTier::High),
            ["fluid", "globe", "morph", "particles", "routes"]
        );
    }

    #[test]
    fn test_static_map_draws_without_frames() {
        let layer = RouteLayer::still(1280.0, 720.0);
        assert!(!layer.surface().shapes.is_empty());
    }

    #[test]
    fn test_static_map_never_moves() {
        let mut layer = RouteLayer::still(1280.0, 720.0);
        let before = layer.fleet().markers().to_vec();
        layer.frame(&ctx(0.0, true));
        layer.frame(&ctx(50.0, true));
        assert_eq!(layer.fleet().markers(), &before[..]);
    }

    #[test]
    fn test_routes_resume_without_catch_up() {
        let mut layer = RouteLayer::animated(1280.0, 720.0);
        layer.frame(&ctx(0.0, true));
        layer.frame(&ctx(16.0, true));
        let before = layer.fleet().markers()[0].progress;

        layer.frame(&ctx(100.0, false));
        layer.frame(&ctx(5_000.0, false));
        assert_eq!(layer.fleet().markers()[0].progress, before);

        // First open frame after a pause takes a zero step
        layer.frame(&ctx(10_000.0, true));
        assert_eq!(layer.fleet().markers()[0].progress, before);
    }

    #[test]
    fn test_medium_particles_are_throttled() {
        let mut rng = init_rng(Some(8));
        let mut layer = ParticleLayer::new(PerformanceTier::Medium, 800.0, 600.0, &mut rng);
        layer.frame(&ctx(0.0, true));
        let after_first = layer.system().particles().to_vec();
        layer.frame(&ctx(16.0, true));
        assert_eq!(layer.system().particles(), &after_first[..]);
        layer.frame(&ctx(33.0, true));
        assert_ne!(layer.system().particles(), &after_first[..]);
    }

    #[test]
    fn test_high_particles_are_not_throttled() {
        let mut rng = init_rng(Some(8));
        let mut layer = ParticleLayer::new(PerformanceTier::High, 800.0, 600.0, &mut rng);
        layer.frame(&ctx(0.0, true));
        let after_first = layer.system().particles().to_vec();
        layer.frame(&ctx(16.0, true));
        assert_ne!(layer.system().particles(), &after_first[..]);
    }

    #[test]
    fn test_gated_layer_keeps_surface() {
        let mut rng = init_rng(Some(8));
        let mut layer = ParticleLayer::new(PerformanceTier::High, 800.0, 600.0, &mut rng);
        layer.frame(&ctx(0.0, true));
        let painted = layer.surface().shapes.clone();
        layer.frame(&ctx(16.0, false));
        assert_eq!(layer.surface().shapes, painted);
    }

    #[test]
    fn test_fluid_paints_image() {
        let mut layer = FluidLayer::new(PerformanceTier::Medium, 400.0, 200.0);
        assert!(layer.surface().image.is_none());
        layer.frame(&ctx(0.0, true));
        let image = layer.surface().image.as_ref().unwrap();
        assert_eq!((image.width, image.height), (200, 100));
    }

    #[test]
    fn test_particle_links_respect_cap() {
        let mut rng = init_rng(Some(13));
        let mut layer = ParticleLayer::new(PerformanceTier::High, 300.0, 200.0, &mut rng);
        for frame in 0..20 {
            layer.frame(&ctx(frame as f64 * 16.0, true));
            let mut counts = vec![0usize; layer.particle_count()];
            for link in layer.links() {
                counts[link.a] += 1;
                counts[link.b] += 1;
            }
            assert!(counts.iter().all(|&c| c <= crate::config::MAX_LINKS_PER_PARTICLE));
        }
    }
}
