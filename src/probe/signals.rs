use std::env;

use super::power;

/// Environment signal for the OS-level reduced-motion preference
pub const REDUCED_MOTION_VAR: &str = "BACKDROP_REDUCED_MOTION";
/// Environment signal carrying a network effective type (`4g`, `3g`, `slow`...)
pub const CONNECTION_VAR: &str = "BACKDROP_CONNECTION";
/// Environment signal forcing the mobile device class
pub const FORCE_MOBILE_VAR: &str = "BACKDROP_FORCE_MOBILE";
/// Environment signal pinning the performance tier at mount
pub const TIER_HINT_VAR: &str = "BACKDROP_TIER";

/// Network class bucketed from an effective connection type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionClass {
    Fast,
    Slow,
    #[default]
    Unknown,
}

impl ConnectionClass {
    pub fn from_effective_type(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "4g" | "5g" | "wifi" | "ethernet" | "fast" => ConnectionClass::Fast,
            "slow-2g" | "2g" | "3g" | "slow" => ConnectionClass::Slow,
            _ => ConnectionClass::Unknown,
        }
    }
}

/// Host signals that may change while mounted and are re-read on every probe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HostSignals {
    pub is_mobile: bool,
    pub is_low_power: bool,
    pub prefers_reduced_motion: bool,
    pub connection: ConnectionClass,
}

/// Source of host signals; swapped out in tests
pub trait SignalSource {
    fn sample(&mut self) -> HostSignals;
}

/// Reads the running system: environment, target OS and sysfs battery
#[derive(Default)]
pub struct SystemSignals;

impl SignalSource for SystemSignals {
    fn sample(&mut self) -> HostSignals {
        let is_mobile = cfg!(any(target_os = "android", target_os = "ios"))
            || env::var(FORCE_MOBILE_VAR).map(|v| is_truthy(&v)).unwrap_or(false);

        let is_low_power = power::read_battery()
            .map(|battery| battery.is_low_power())
            .unwrap_or(false);

        let prefers_reduced_motion = env::var(REDUCED_MOTION_VAR)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let connection = env::var(CONNECTION_VAR)
            .map(|v| ConnectionClass::from_effective_type(&v))
            .unwrap_or_default();

        HostSignals {
            is_mobile,
            is_low_power,
            prefers_reduced_motion,
            connection,
        }
    }
}

/// Fixed signals, for tier hints and tests
impl SignalSource for HostSignals {
    fn sample(&mut self) -> HostSignals {
        *self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "reduce"
    )
}
