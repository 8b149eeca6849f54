use std::env;

use winit::event_loop::EventLoop;

use route_backdrop::app::App;
use route_backdrop::error::BackdropResult;
use route_backdrop::policy::PerformanceTier;
use route_backdrop::probe::{probe_gpu, TIER_HINT_VAR};

fn tier_hint() -> Option<PerformanceTier> {
    let value = env::var(TIER_HINT_VAR).ok()?;
    match value.parse() {
        Ok(tier) => Some(tier),
        Err(e) => {
            log::warn!("Ignoring {}: {}", TIER_HINT_VAR, e);
            None
        }
    }
}

fn main() -> BackdropResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Probing GPU backends...");
    let gpu = pollster::block_on(probe_gpu());
    log::info!(
        "GPU: accel={} v2={} max texture {}",
        gpu.supports_gpu_accel,
        gpu.supports_gpu_accel_v2,
        gpu.max_texture_size
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(gpu, tier_hint());
    event_loop.run_app(&mut app)?;
    Ok(())
}
