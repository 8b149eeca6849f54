use std::fs;
use std::path::Path;

use crate::config::LOW_BATTERY_LEVEL;

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

/// Battery reading, level in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatteryStatus {
    pub level: f32,
    pub charging: bool,
}

impl BatteryStatus {
    pub fn is_low_power(&self) -> bool {
        !self.charging && self.level < LOW_BATTERY_LEVEL
    }
}

/// Best-effort battery query. Hosts without a readable battery yield None.
pub fn read_battery() -> Option<BatteryStatus> {
    let entries = fs::read_dir(POWER_SUPPLY_DIR).ok()?;
    entries
        .filter_map(Result::ok)
        .find_map(|entry| read_supply(&entry.path()))
}

fn read_supply(dir: &Path) -> Option<BatteryStatus> {
    let kind = fs::read_to_string(dir.join("type")).ok()?;
    if kind.trim() != "Battery" {
        return None;
    }
    let capacity = fs::read_to_string(dir.join("capacity")).ok()?;
    let status = fs::read_to_string(dir.join("status")).unwrap_or_default();
    parse_battery(&capacity, &status)
}

/// Parse sysfs `capacity` (percent) and `status` contents
pub fn parse_battery(capacity: &str, status: &str) -> Option<BatteryStatus> {
    let percent: f32 = capacity.trim().parse().ok()?;
    let charging = matches!(status.trim(), "Charging" | "Full" | "Not charging");
    Some(BatteryStatus {
        level: (percent / 100.0).clamp(0.0, 1.0),
        charging,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_discharging_low() {
        let status = parse_battery("15\n", "Discharging\n").unwrap();
        assert!((status.level - 0.15).abs() < 1e-6);
        assert!(!status.charging);
        assert!(status.is_low_power());
    }

    #[test]
    fn test_charging_is_never_low_power() {
        let status = parse_battery("5", "Charging").unwrap();
        assert!(!status.is_low_power());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let status = parse_battery("20", "Discharging").unwrap();
        assert!(!status.is_low_power());
    }

    #[test]
    fn test_garbage_capacity_is_none() {
        assert_eq!(parse_battery("unknown", "Discharging"), None);
    }
}
