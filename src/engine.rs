//! The per-frame engine behind a mounted backdrop.
//!
//! The host owns only mount/unmount and the setters below; it drives
//! `frame` from its frame callback and composites `surfaces` in order.
//! Nothing in here touches a window or a GPU.

use std::time::{Duration, Instant};

use glam::Vec2;
use rand::rngs::StdRng;

use crate::playback::{PlaybackCoordinator, PlaybackState};
use crate::policy::{select_mode, AnimationMode, PerformanceTier};
use crate::probe::{CapabilityProbe, DeviceCapabilities, GpuSupport, SignalSource, SystemSignals};
use crate::render::{compose_layers, FrameContext, Layer, LayerSurface};
use crate::simulation::init_rng;

/// A gap between frame callbacks longer than this restarts FPS sampling
const FRAME_STALL: Duration = Duration::from_millis(250);

pub struct Engine<S: SignalSource = SystemSignals> {
    probe: CapabilityProbe<S>,
    playback: PlaybackCoordinator,
    capabilities: Option<DeviceCapabilities>,
    mode: Option<AnimationMode>,
    layers: Vec<Box<dyn Layer>>,
    size: (f32, f32),
    pointer: Option<Vec2>,
    rng: StdRng,
    forced_static: bool,
    mounted_at: Instant,
    last_frame: Option<Instant>,
}

impl Engine<SystemSignals> {
    /// Mount against a `width` x `height` surface using the running system's
    /// signals. With a tier hint the first frame already resolves the tier.
    pub fn mount(
        width: f32,
        height: f32,
        tier_hint: Option<PerformanceTier>,
        gpu: GpuSupport,
        now: Instant,
    ) -> Self {
        Self::mount_with(SystemSignals, width, height, tier_hint, gpu, now)
    }
}

impl<S: SignalSource> Engine<S> {
    pub fn mount_with(
        source: S,
        width: f32,
        height: f32,
        tier_hint: Option<PerformanceTier>,
        gpu: GpuSupport,
        now: Instant,
    ) -> Self {
        let screen_pixels = (width.max(0.0) as u64) * (height.max(0.0) as u64);
        log::info!(
            "Mounting backdrop at {}x{}{}",
            width,
            height,
            tier_hint.map(|t| format!(" (tier hint: {})", t)).unwrap_or_default()
        );
        Self {
            probe: CapabilityProbe::new(source, gpu, screen_pixels, now).with_tier_hint(tier_hint),
            playback: PlaybackCoordinator::new(),
            capabilities: None,
            mode: None,
            layers: Vec::new(),
            size: (width, height),
            pointer: None,
            rng: init_rng(None),
            forced_static: false,
            mounted_at: now,
            last_frame: None,
        }
    }

    /// Seed layer initialization. Only affects layers built afterwards.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = init_rng(Some(seed));
        self
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playback.set_playing(playing);
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.playback.set_paused(paused);
    }

    pub fn set_page_visible(&mut self, visible: bool) {
        self.playback.set_page_visible(visible);
    }

    pub fn set_intersection(&mut self, ratio: f32) {
        self.playback.set_intersection(ratio);
    }

    pub fn set_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer;
    }

    pub fn set_screen_pixels(&mut self, pixels: u64) {
        self.probe.set_screen_pixels(pixels);
    }

    pub fn signal_source_mut(&mut self) -> &mut S {
        self.probe.source_mut()
    }

    /// Zero or negative sizes are ignored and the previous layout kept
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.size = (width, height);
        for layer in &mut self.layers {
            layer.resize(width, height);
        }
    }

    /// The drawing surface could not be acquired: show only the static image
    pub fn force_static(&mut self) {
        log::warn!("Falling back to the static image");
        self.forced_static = true;
        self.mode = Some(AnimationMode::Static);
        let tier = self.tier().unwrap_or(PerformanceTier::Minimal);
        let (width, height) = self.size;
        self.layers = compose_layers(AnimationMode::Static, tier, width, height, &mut self.rng);
        self.playback.set_ready(true);
    }

    /// Run one scheduled frame. Returns whether the animation gate was open.
    pub fn frame(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_frame {
            if now.saturating_duration_since(last) > FRAME_STALL {
                self.probe.restart_fps();
            }
        }
        self.last_frame = Some(now);
        self.probe.record_frame(now);

        if let Some(caps) = self.probe.poll(now) {
            self.apply(caps);
        }

        let should_animate = self.playback.begin_frame();
        let ctx = FrameContext {
            now_ms: now.saturating_duration_since(self.mounted_at).as_secs_f64() * 1000.0,
            should_animate,
            pointer: self.pointer,
        };
        for layer in &mut self.layers {
            layer.frame(&ctx);
        }
        should_animate
    }

    fn apply(&mut self, caps: DeviceCapabilities) {
        let mode = if self.forced_static {
            AnimationMode::Static
        } else {
            select_mode(caps.tier, &caps, caps.prefers_reduced_motion)
        };
        let tier_changed = self.capabilities.map(|c| c.tier) != Some(caps.tier);
        self.capabilities = Some(caps);

        if tier_changed || self.mode != Some(mode) {
            log::info!("Tier {} selects {} mode", caps.tier, mode);
            let (width, height) = self.size;
            self.layers = compose_layers(mode, caps.tier, width, height, &mut self.rng);
            self.mode = Some(mode);
        }
        self.playback.set_ready(true);
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &LayerSurface> + '_ {
        self.layers.iter().map(|layer| layer.surface())
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    pub fn mode(&self) -> Option<AnimationMode> {
        self.mode
    }

    pub fn tier(&self) -> Option<PerformanceTier> {
        self.capabilities.map(|c| c.tier)
    }

    pub fn capabilities(&self) -> Option<&DeviceCapabilities> {
        self.capabilities.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.playback.state().is_ready
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn should_animate(&self) -> bool {
        self.playback.should_animate()
    }

    pub fn particle_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.particle_count()).sum()
    }

    /// Synchronous teardown; every layer is dropped here
    pub fn unmount(self) -> PlaybackState {
        log::info!(
            "Unmounting backdrop after {} animated frames",
            self.playback.state().frame_count
        );
        self.playback.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ConnectionClass, HostSignals};

    fn accelerated() -> GpuSupport {
        GpuSupport {
            supports_gpu_accel: true,
            supports_gpu_accel_v2: true,
            max_texture_size: 16_384,
        }
    }

    fn desktop() -> HostSignals {
        HostSignals {
            connection: ConnectionClass::Fast,
            ..HostSignals::default()
        }
    }

    fn mount(source: HostSignals, gpu: GpuSupport, hint: Option<PerformanceTier>, start: Instant) -> Engine<HostSignals> {
        Engine::mount_with(source, 1920.0, 1080.0, hint, gpu, start).with_seed(42)
    }

    /// Frames every 16 ms through `until_ms` inclusive
    fn run(engine: &mut Engine<HostSignals>, start: Instant, from_ms: u64, until_ms: u64) {
        let mut t = from_ms;
        while t <= until_ms {
            engine.frame(start + Duration::from_millis(t));
            t += 16;
        }
    }

    #[test]
    fn test_not_ready_before_settle() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), None, start);
        run(&mut engine, start, 0, 496);
        assert!(!engine.is_ready());
        assert_eq!(engine.mode(), None);
        assert_eq!(engine.playback_state().frame_count, 0);
        assert_eq!(engine.surfaces().count(), 0);
    }

    #[test]
    fn test_desktop_resolves_webgl() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), None, start);
        run(&mut engine, start, 0, 512);
        assert!(engine.is_ready());
        assert_eq!(engine.tier(), Some(PerformanceTier::High));
        assert_eq!(engine.mode(), Some(AnimationMode::Webgl));
        assert_eq!(engine.layer_names(), ["fluid", "globe", "morph", "particles", "routes"]);
    }

    #[test]
    fn test_48fps_desktop_resolves_medium() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), None, start);
        let mut i = 0u64;
        while !engine.is_ready() && i < 60 {
            engine.frame(start + Duration::from_micros(i * 20_833));
            i += 1;
        }
        assert_eq!(engine.tier(), Some(PerformanceTier::Medium));
        assert_eq!(engine.mode(), Some(AnimationMode::Canvas));
    }

    #[test]
    fn test_desktop_without_v2_resolves_canvas() {
        let start = Instant::now();
        let gpu = GpuSupport {
            supports_gpu_accel_v2: false,
            ..accelerated()
        };
        let mut engine = mount(desktop(), gpu, None, start);
        run(&mut engine, start, 0, 512);
        assert_eq!(engine.tier(), Some(PerformanceTier::High));
        assert_eq!(engine.mode(), Some(AnimationMode::Canvas));
    }

    #[test]
    fn test_reduced_motion_is_static_without_particles() {
        let start = Instant::now();
        let source = HostSignals {
            prefers_reduced_motion: true,
            ..desktop()
        };
        let mut engine = mount(source, accelerated(), None, start);
        run(&mut engine, start, 0, 512);
        assert_eq!(engine.tier(), Some(PerformanceTier::Minimal));
        assert_eq!(engine.mode(), Some(AnimationMode::Static));
        assert_eq!(engine.particle_count(), 0);
        assert!(engine.surfaces().all(|s| s.image.is_none()));
    }

    #[test]
    fn test_tier_hint_is_ready_on_first_frame() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), Some(PerformanceTier::Medium), start);
        assert!(engine.frame(start));
        assert_eq!(engine.mode(), Some(AnimationMode::Canvas));
        assert_eq!(engine.layer_names(), ["fluid", "particles", "routes"]);
    }

    #[test]
    fn test_paused_frames_mutate_nothing() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), None, start);
        run(&mut engine, start, 0, 640);
        let count = engine.playback_state().frame_count;
        assert!(count > 0);

        engine.set_paused(true);
        let before: Vec<LayerSurface> = engine.surfaces().cloned().collect();
        run(&mut engine, start, 656, 1_200);
        let after: Vec<LayerSurface> = engine.surfaces().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(engine.playback_state().frame_count, count);

        engine.set_paused(false);
        assert!(engine.frame(start + Duration::from_millis(1_216)));
        assert_eq!(engine.playback_state().frame_count, count + 1);
    }

    #[test]
    fn test_hidden_page_closes_gate() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), Some(PerformanceTier::Low), start);
        engine.set_page_visible(false);
        assert!(!engine.frame(start));
        engine.set_page_visible(true);
        engine.set_intersection(0.0);
        assert!(!engine.frame(start + Duration::from_millis(16)));
        engine.set_intersection(0.1);
        assert!(engine.frame(start + Duration::from_millis(32)));
    }

    #[test]
    fn test_reprobe_follows_motion_preference() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), None, start);
        run(&mut engine, start, 0, 512);
        assert_eq!(engine.mode(), Some(AnimationMode::Webgl));

        engine.signal_source_mut().prefers_reduced_motion = true;
        run(&mut engine, start, 528, 2_400);
        assert_eq!(engine.mode(), Some(AnimationMode::Webgl));
        run(&mut engine, start, 2_416, 2_544);
        assert_eq!(engine.mode(), Some(AnimationMode::Static));
        assert_eq!(engine.particle_count(), 0);
    }

    #[test]
    fn test_force_static_overrides_probe() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), None, start);
        engine.force_static();
        assert!(engine.is_ready());
        assert_eq!(engine.mode(), Some(AnimationMode::Static));
        run(&mut engine, start, 0, 512);
        assert_eq!(engine.mode(), Some(AnimationMode::Static));
        assert_eq!(engine.layer_names(), ["static-map"]);
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let start = Instant::now();
        let mut engine = mount(desktop(), accelerated(), Some(PerformanceTier::Medium), start);
        engine.frame(start);
        engine.resize(0.0, 600.0);
        let before: Vec<LayerSurface> = engine.surfaces().cloned().collect();
        engine.set_paused(true);
        engine.resize(-5.0, -5.0);
        let after: Vec<LayerSurface> = engine.surfaces().cloned().collect();
        assert_eq!(before, after);
    }
}
