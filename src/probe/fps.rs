use std::time::{Duration, Instant};

use crate::config::FPS_WINDOW_MS;

/// Rolling one-second counter of animation-frame callbacks.
///
/// The first callback only anchors the window; every later one closes an
/// interval. `fps` always reflects the latest full window, or an
/// extrapolation of the current partial window before the first one completes.
#[derive(Default)]
pub struct FpsMeter {
    window_start: Option<Instant>,
    intervals: u32,
    last_fps: Option<u32>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame callback, returns Some(fps) each time a window closes
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };
        self.intervals += 1;
        let elapsed = now.saturating_duration_since(start);

        if elapsed >= Duration::from_millis(FPS_WINDOW_MS) {
            let fps = (self.intervals as f64 / elapsed.as_secs_f64()).round() as u32;
            self.intervals = 0;
            self.window_start = Some(now);
            self.last_fps = Some(fps);
            Some(fps)
        } else {
            None
        }
    }

    pub fn fps(&self, now: Instant) -> u32 {
        if let Some(fps) = self.last_fps {
            return fps;
        }
        let Some(start) = self.window_start else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        if elapsed > 0.0 {
            (self.intervals as f64 / elapsed).round() as u32
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_window_reports_fps() {
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        let mut reported = None;
        for i in 0..=60u64 {
            reported = meter.tick(start + Duration::from_micros(i * 16_667));
        }
        assert_eq!(reported, Some(60));
        assert_eq!(meter.fps(start + Duration::from_secs(2)), 60);
    }

    #[test]
    fn test_partial_window_extrapolates() {
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        for i in 1..=15u64 {
            assert_eq!(meter.tick(start + Duration::from_millis(i * 33)), None);
        }
        let fps = meter.fps(start + Duration::from_millis(500));
        assert_eq!(fps, 30);
    }

    #[test]
    fn test_partial_window_counts_intervals() {
        // 48 Hz: 25 frames after the anchor span about 521 ms
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        let mut last = start;
        for i in 0..=25u64 {
            last = start + Duration::from_micros(i * 20_833);
            meter.tick(last);
        }
        assert_eq!(meter.fps(last), 48);
    }

    #[test]
    fn test_no_frames_is_zero() {
        let start = Instant::now();
        let mut meter = FpsMeter::new();
        assert_eq!(meter.fps(start), 0);
        meter.tick(start);
        assert_eq!(meter.fps(start), 0);
        assert_eq!(meter.fps(start + Duration::from_millis(500)), 0);
    }
}
