//! Runtime capability detection.
//!
//! Each individual probe degrades to a safe default when its host API is
//! missing; detection as a whole never fails.

mod fps;
mod gpu;
mod power;
mod signals;

use std::time::{Duration, Instant};

pub use fps::FpsMeter;
pub use gpu::{probe_gpu, GpuSupport};
pub use power::{parse_battery, read_battery, BatteryStatus};
pub use signals::{ConnectionClass, HostSignals, SignalSource, SystemSignals, TIER_HINT_VAR};

use crate::config::{PROBE_SETTLE_MS, REPROBE_INTERVAL_MS};
use crate::policy::{classify_tier, PerformanceTier, TierThresholds};

/// Raw probe output consumed by the tier policy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapabilitySignals {
    pub fps: u32,
    pub gpu: GpuSupport,
    pub is_mobile: bool,
    pub screen_pixels: u64,
    pub is_low_power: bool,
    pub prefers_reduced_motion: bool,
    pub connection: ConnectionClass,
}

/// Immutable capability snapshot with its derived tier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub tier: PerformanceTier,
    pub supports_gpu_accel: bool,
    pub supports_gpu_accel_v2: bool,
    pub max_texture_size: u32,
    pub is_mobile: bool,
    pub is_low_power: bool,
    pub prefers_reduced_motion: bool,
    pub connection_class: ConnectionClass,
}

impl DeviceCapabilities {
    pub fn from_signals(signals: &CapabilitySignals, thresholds: &TierThresholds) -> Self {
        Self::with_tier(signals, classify_tier(signals, thresholds))
    }

    /// Snapshot with a caller-pinned tier
    pub fn with_tier(signals: &CapabilitySignals, tier: PerformanceTier) -> Self {
        Self {
            tier,
            supports_gpu_accel: signals.gpu.supports_gpu_accel,
            supports_gpu_accel_v2: signals.gpu.supports_gpu_accel_v2,
            max_texture_size: signals.gpu.max_texture_size,
            is_mobile: signals.is_mobile,
            is_low_power: signals.is_low_power,
            prefers_reduced_motion: signals.prefers_reduced_motion,
            connection_class: signals.connection,
        }
    }
}

/// Collects signals after mount and produces capability snapshots.
///
/// The first snapshot is available once the settle window has elapsed;
/// later snapshots follow every `REPROBE_INTERVAL_MS`. FPS is sampled on
/// every recorded frame.
pub struct CapabilityProbe<S: SignalSource = SystemSignals> {
    source: S,
    gpu: GpuSupport,
    fps: FpsMeter,
    screen_pixels: u64,
    thresholds: TierThresholds,
    tier_hint: Option<PerformanceTier>,
    mounted_at: Instant,
    last_probe: Option<Instant>,
}

impl<S: SignalSource> CapabilityProbe<S> {
    pub fn new(source: S, gpu: GpuSupport, screen_pixels: u64, now: Instant) -> Self {
        Self {
            source,
            gpu,
            fps: FpsMeter::new(),
            screen_pixels,
            thresholds: TierThresholds::default(),
            tier_hint: None,
            mounted_at: now,
            last_probe: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: TierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Pin the tier; signals are still sampled for the rest of the snapshot
    pub fn with_tier_hint(mut self, tier: Option<PerformanceTier>) -> Self {
        self.tier_hint = tier;
        self
    }

    pub fn record_frame(&mut self, now: Instant) -> Option<u32> {
        self.fps.tick(now)
    }

    /// Restart FPS sampling, e.g. after a stretch without frame callbacks
    pub fn restart_fps(&mut self) {
        self.fps = FpsMeter::new();
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn set_screen_pixels(&mut self, pixels: u64) {
        self.screen_pixels = pixels;
    }

    pub fn fps(&self, now: Instant) -> u32 {
        self.fps.fps(now)
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        self.tier_hint.is_some()
            || now.saturating_duration_since(self.mounted_at)
                >= Duration::from_millis(PROBE_SETTLE_MS)
    }

    pub fn signals(&mut self, now: Instant) -> CapabilitySignals {
        let host = self.source.sample();
        CapabilitySignals {
            fps: self.fps.fps(now),
            gpu: self.gpu,
            is_mobile: host.is_mobile,
            screen_pixels: self.screen_pixels,
            is_low_power: host.is_low_power,
            prefers_reduced_motion: host.prefers_reduced_motion,
            connection: host.connection,
        }
    }

    /// Returns a fresh snapshot when one is due
    pub fn poll(&mut self, now: Instant) -> Option<DeviceCapabilities> {
        if !self.is_settled(now) {
            return None;
        }
        let due = match self.last_probe {
            None => true,
            Some(last) => {
                now.saturating_duration_since(last) >= Duration::from_millis(REPROBE_INTERVAL_MS)
            }
        };
        if !due {
            return None;
        }

        self.last_probe = Some(now);
        let signals = self.signals(now);
        let caps = match self.tier_hint {
            Some(tier) => DeviceCapabilities::with_tier(&signals, tier),
            None => DeviceCapabilities::from_signals(&signals, &self.thresholds),
        };
        log::debug!("Capability probe: {:?} -> {:?}", signals, caps);
        Some(caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accelerated() -> GpuSupport {
        GpuSupport {
            supports_gpu_accel: true,
            supports_gpu_accel_v2: true,
            max_texture_size: 8192,
        }
    }

    fn feed_frames(probe: &mut CapabilityProbe<HostSignals>, start: Instant, until_ms: u64) {
        let mut t = 16;
        while t <= until_ms {
            probe.record_frame(start + Duration::from_millis(t));
            t += 16;
        }
    }

    #[test]
    fn test_no_snapshot_before_settle() {
        let start = Instant::now();
        let mut probe = CapabilityProbe::new(HostSignals::default(), accelerated(), 1920 * 1080, start);
        assert_eq!(probe.poll(start + Duration::from_millis(100)), None);
        assert!(!probe.is_settled(start + Duration::from_millis(499)));
    }

    #[test]
    fn test_snapshot_after_settle_then_interval() {
        let start = Instant::now();
        let mut probe = CapabilityProbe::new(HostSignals::default(), accelerated(), 1920 * 1080, start);
        feed_frames(&mut probe, start, 500);

        let caps = probe.poll(start + Duration::from_millis(500)).unwrap();
        assert_eq!(caps.tier, PerformanceTier::High);
        assert_eq!(caps.max_texture_size, 8192);

        assert_eq!(probe.poll(start + Duration::from_millis(600)), None);
        assert!(probe.poll(start + Duration::from_millis(2_600)).is_some());
    }

    #[test]
    fn test_tier_hint_skips_settle() {
        let start = Instant::now();
        let mut probe = CapabilityProbe::new(HostSignals::default(), GpuSupport::default(), 0, start)
            .with_tier_hint(Some(PerformanceTier::Medium));
        let caps = probe.poll(start).unwrap();
        assert_eq!(caps.tier, PerformanceTier::Medium);
        assert!(!caps.supports_gpu_accel);
    }

    #[test]
    fn test_missing_gpu_degrades_to_low() {
        let start = Instant::now();
        let mut probe = CapabilityProbe::new(HostSignals::default(), GpuSupport::default(), 1920 * 1080, start);
        feed_frames(&mut probe, start, 500);
        let caps = probe.poll(start + Duration::from_millis(500)).unwrap();
        assert_eq!(caps.tier, PerformanceTier::Low);
    }

    #[test]
    fn test_reduced_motion_signal() {
        let start = Instant::now();
        let signals = HostSignals {
            prefers_reduced_motion: true,
            ..HostSignals::default()
        };
        let mut probe = CapabilityProbe::new(signals, accelerated(), 1920 * 1080, start);
        let caps = probe.poll(start + Duration::from_millis(500)).unwrap();
        assert_eq!(caps.tier, PerformanceTier::Minimal);
        assert!(caps.prefers_reduced_motion);
    }
}
