use std::fmt;
use std::str::FromStr;

use crate::config::{HIGH_MIN_FPS, HIGH_TIER_MAX_PIXELS, MEDIUM_MIN_FPS};
use crate::error::BackdropError;
use crate::probe::{CapabilitySignals, ConnectionClass, DeviceCapabilities};

/// Coarse device-capability classification, ordered least to most capable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PerformanceTier {
    Minimal,
    Low,
    Medium,
    High,
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PerformanceTier::Minimal => "minimal",
            PerformanceTier::Low => "low",
            PerformanceTier::Medium => "medium",
            PerformanceTier::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for PerformanceTier {
    type Err = BackdropError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(PerformanceTier::Minimal),
            "low" => Ok(PerformanceTier::Low),
            "medium" => Ok(PerformanceTier::Medium),
            "high" => Ok(PerformanceTier::High),
            _ => Err(BackdropError::UnknownTier(value.to_string())),
        }
    }
}

/// Concrete rendering strategy selected for a tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    Webgl,
    Canvas,
    Css,
    Static,
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimationMode::Webgl => "webgl",
            AnimationMode::Canvas => "canvas",
            AnimationMode::Css => "css",
            AnimationMode::Static => "static",
        };
        f.write_str(name)
    }
}

/// Tier boundaries. Defaults come from `config`; tests and hosts with
/// different hardware expectations may evaluate other values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierThresholds {
    pub medium_min_fps: u32,
    pub high_min_fps: u32,
    pub high_tier_max_pixels: u64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium_min_fps: MEDIUM_MIN_FPS,
            high_min_fps: HIGH_MIN_FPS,
            high_tier_max_pixels: HIGH_TIER_MAX_PIXELS,
        }
    }
}

/// Map raw probe signals to a tier. Pure and deterministic.
pub fn classify_tier(signals: &CapabilitySignals, thresholds: &TierThresholds) -> PerformanceTier {
    let tier = if signals.prefers_reduced_motion || signals.is_low_power {
        PerformanceTier::Minimal
    } else if !signals.gpu.supports_gpu_accel || signals.fps < thresholds.medium_min_fps {
        PerformanceTier::Low
    } else if signals.is_mobile
        || signals.screen_pixels > thresholds.high_tier_max_pixels
        || signals.fps < thresholds.high_min_fps
    {
        PerformanceTier::Medium
    } else {
        PerformanceTier::High
    };

    // Slow links never get the heaviest tier
    if signals.connection == ConnectionClass::Slow && tier == PerformanceTier::High {
        PerformanceTier::Medium
    } else {
        tier
    }
}

/// Map a tier to a draw strategy. Reduced motion and GPU capability are
/// checked before the raw tier.
pub fn select_mode(
    tier: PerformanceTier,
    caps: &DeviceCapabilities,
    prefers_reduced_motion: bool,
) -> AnimationMode {
    if prefers_reduced_motion || tier == PerformanceTier::Minimal {
        AnimationMode::Static
    } else if tier == PerformanceTier::High && caps.supports_gpu_accel_v2 {
        AnimationMode::Webgl
    } else if matches!(tier, PerformanceTier::Medium | PerformanceTier::High) {
        AnimationMode::Canvas
    } else {
        AnimationMode::Css
    }
}
