//! Adaptive animated backdrop: probes what the device can afford, picks a
//! rendering tier, and runs the route-map simulations that tier allows.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod playback;
pub mod policy;
pub mod probe;
pub mod render;
pub mod routes;
pub mod simulation;

pub use engine::Engine;
pub use error::{BackdropError, BackdropResult};
pub use playback::{PlaybackCoordinator, PlaybackState};
pub use policy::{select_mode, AnimationMode, PerformanceTier};
pub use probe::DeviceCapabilities;
