/// Tunable constants for the backdrop engine.
///
/// Everything here is fixed at compile time; nothing is read from a runtime
/// config object. Tier threshold constants are also gathered into
/// `policy::TierThresholds` so alternative thresholds can be evaluated.

// ============================================
// Capability Probe
// ============================================

/// Time after mount before capability signals are considered stable
pub const PROBE_SETTLE_MS: u64 = 500;

/// Interval between capability re-evaluations after the first decision
pub const REPROBE_INTERVAL_MS: u64 = 2_000;

/// Window over which animation-frame callbacks are counted for FPS
pub const FPS_WINDOW_MS: u64 = 1_000;

/// Battery level below which a discharging device counts as low power
pub const LOW_BATTERY_LEVEL: f32 = 0.2;

/// Texture size assumed when no GPU adapter reports limits
pub const FALLBACK_MAX_TEXTURE_SIZE: u32 = 0;

// ============================================
// Tier Policy
// ============================================

/// Minimum sampled FPS for anything above the `low` tier
pub const MEDIUM_MIN_FPS: u32 = 30;

/// Minimum sampled FPS for the `high` tier
pub const HIGH_MIN_FPS: u32 = 50;

/// Screens with more pixels than this are capped at the `medium` tier
pub const HIGH_TIER_MAX_PIXELS: u64 = 2560 * 1440;

// ============================================
// Playback
// ============================================

/// Visible fraction of the surface required to count as "in viewport".
/// Zero means any overlap.
pub const VIEWPORT_THRESHOLD: f32 = 0.0;

/// Frame-time floor (~30 FPS) for the medium-tier particle layer and the fluid layer
pub const FRAME_FLOOR_MS: f64 = 33.0;

// ============================================
// Route / Path Model
// ============================================

/// Number of points sampled along every route, independent of route length
pub const ROUTE_SAMPLE_POINTS: usize = 150;

/// Perpendicular control-point offset as a fraction of chord length
pub const ROUTE_CURVATURE: f32 = 0.25;

/// Progress offset used for the central-difference heading
pub const HEADING_DELTA: f32 = 0.01;

/// Default padding between the container edge and the outermost city
pub const ROUTE_PADDING: f32 = 60.0;

/// City markers at or above this importance get a label halo
pub const LABEL_IMPORTANCE_THRESHOLD: f32 = 0.7;

/// Marker radius range in pixels, scaled by city importance
pub const CITY_MARKER_MIN_RADIUS: f32 = 3.0;
pub const CITY_MARKER_MAX_RADIUS: f32 = 8.0;

/// Transport speeds in progress units per millisecond
pub const SHIP_SPEED: f32 = 0.000_04;
pub const TRUCK_SPEED: f32 = 0.000_07;
pub const PLANE_SPEED: f32 = 0.000_12;

/// Dash pattern for dashed routes, in sampled segments (on, off)
pub const DASH_PATTERN: (usize, usize) = (4, 3);

/// Dash offset advance per millisecond while playing, in segments
pub const DASH_FLOW_SPEED: f32 = 0.004;

// ============================================
// 2D Particle Simulation
// ============================================

/// Particle counts per tier; fixed at initialization
pub const PARTICLE_COUNT_HIGH: usize = 120;
pub const PARTICLE_COUNT_MEDIUM: usize = 60;
pub const PARTICLE_COUNT_LOW: usize = 24;

/// Pointer attraction radius (top tier only)
pub const INTERACTION_RADIUS: f32 = 150.0;

/// Scale applied to the attraction force before adding it to velocity
pub const ATTRACTION_STRENGTH: f32 = 0.02;

/// Proximity link radius
pub const LINK_RADIUS: f32 = 100.0;

/// Maximum proximity links any particle may take part in per frame
pub const MAX_LINKS_PER_PARTICLE: usize = 3;

/// Particle size range in pixels
pub const PARTICLE_MIN_SIZE: f32 = 1.0;
pub const PARTICLE_MAX_SIZE: f32 = 3.0;

/// Maximum initial speed per axis, in pixels per frame
pub const PARTICLE_MAX_SPEED: f32 = 0.5;

/// Lifetime range in frames
pub const PARTICLE_MIN_LIFE: f32 = 200.0;
pub const PARTICLE_MAX_LIFE: f32 = 600.0;

/// Opacity range re-rolled on every recycle
pub const PARTICLE_MIN_OPACITY: f32 = 0.2;
pub const PARTICLE_MAX_OPACITY: f32 = 0.8;

/// Particle palettes per tier (RGBA, linear 0..1)
pub const PALETTE_HIGH: [[f32; 4]; 4] = [
    [0.23, 0.51, 0.96, 1.0],
    [0.02, 0.71, 0.83, 1.0],
    [0.55, 0.36, 0.96, 1.0],
    [0.06, 0.73, 0.51, 1.0],
];
pub const PALETTE_MEDIUM: [[f32; 4]; 3] = [
    [0.23, 0.51, 0.96, 1.0],
    [0.02, 0.71, 0.83, 1.0],
    [0.39, 0.40, 0.95, 1.0],
];
pub const PALETTE_LOW: [[f32; 4]; 2] = [[0.23, 0.51, 0.96, 1.0], [0.58, 0.64, 0.72, 1.0]];

/// Link line color; alpha is modulated per link
pub const LINK_COLOR: [f32; 4] = [0.39, 0.58, 0.93, 0.35];

// ============================================
// Fluid Field Simulation
// ============================================

/// Grid columns per tier; rows follow the container aspect ratio
pub const FLUID_COLS_HIGH: usize = 80;
pub const FLUID_COLS_MEDIUM: usize = 50;
pub const FLUID_COLS_LOW: usize = 30;

/// Neighbor-averaging weight (< 1)
pub const FLUID_VISCOSITY: f32 = 0.98;

/// Multiplicative density decay per step (< 1)
pub const FLUID_FADE_SPEED: f32 = 0.985;

/// Density below this snaps to zero
pub const FLUID_DENSITY_FLOOR: f32 = 1e-6;

/// Pointer impulse radius, in grid cells
pub const FLUID_IMPULSE_RADIUS: f32 = 4.0;

/// Minimum pointer movement (pixels per step) before an impulse is injected
pub const FLUID_MIN_POINTER_SPEED: f32 = 1.0;

/// Velocity injected per pixel of pointer movement
pub const FLUID_FORCE: f32 = 0.15;

/// Density injected at the impulse centre
pub const FLUID_DENSITY_INJECTION: f32 = 0.5;

/// Output pixel stride when sampling the grid into a bitmap
pub const FLUID_PIXEL_STRIDE: u32 = 2;

/// Hue rotation per millisecond for the fluid tint
pub const FLUID_HUE_SPEED: f32 = 0.01;

// ============================================
// Ambient (CSS-tier) dots
// ============================================

/// Keyframe cycle length for one ambient dot float
pub const AMBIENT_CYCLE_MS: f64 = 12_000.0;

/// Vertical float amplitude in pixels
pub const AMBIENT_FLOAT_AMPLITUDE: f32 = 24.0;

// ============================================
// Top-tier 3D effects
// ============================================

/// Points distributed over the globe
pub const GLOBE_POINTS: usize = 1_200;

/// Globe rotation, radians per millisecond
pub const GLOBE_ROTATION_SPEED: f32 = 0.000_15;

/// Globe radius as a fraction of the shorter surface side
pub const GLOBE_RADIUS_FRACTION: f32 = 0.32;

/// Camera distance for the perspective projection, in globe radii
pub const CAMERA_DISTANCE: f32 = 3.0;

/// Samples per 3D arc
pub const ARC_SAMPLE_POINTS: usize = 48;

/// Arc apex lift above the sphere, as a fraction of the chord length
pub const ARC_LIFT: f32 = 0.35;

/// Particles in the morphing point cloud
pub const MORPH_PARTICLES: usize = 900;

/// Time each morph target shape is held, in milliseconds
pub const MORPH_SHAPE_DURATION_MS: f64 = 4_000.0;

/// Spring constant pulling particles toward the blended target
pub const MORPH_SPRING: f32 = 0.04;

/// Velocity damping per step
pub const MORPH_DAMPING: f32 = 0.88;

// ============================================
// Background
// ============================================

/// Clear color behind every layer
pub const BACKGROUND_COLOR: [f64; 4] = [0.02, 0.04, 0.09, 1.0];
