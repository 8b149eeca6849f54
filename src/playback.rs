use crate::config::VIEWPORT_THRESHOLD;

/// Inputs to the shared animation gate, plus the frame counter.
///
/// `should_animate` is always recomputed from the inputs; it is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_in_viewport: bool,
    pub is_page_visible: bool,
    pub is_ready: bool,
    pub frame_count: u64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: true,
            is_paused: false,
            is_in_viewport: true,
            is_page_visible: true,
            is_ready: false,
            frame_count: 0,
        }
    }
}

impl PlaybackState {
    pub fn should_animate(&self) -> bool {
        self.is_playing && !self.is_paused && self.is_in_viewport && self.is_page_visible && self.is_ready
    }
}

/// Owns the process-wide playback inputs. Simulations only ever see the
/// derived `should_animate` boolean handed to them each frame.
pub struct PlaybackCoordinator {
    state: PlaybackState,
    viewport_threshold: f32,
}

impl Default for PlaybackCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackCoordinator {
    pub fn new() -> Self {
        Self::with_viewport_threshold(VIEWPORT_THRESHOLD)
    }

    /// `threshold` is the visible fraction that must be exceeded; 0 means any overlap
    pub fn with_viewport_threshold(threshold: f32) -> Self {
        Self {
            state: PlaybackState::default(),
            viewport_threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn should_animate(&self) -> bool {
        self.state.should_animate()
    }

    pub fn play(&mut self) {
        self.set_playing(true);
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.state.is_playing != playing {
            log::debug!("Playback intent: {}", if playing { "play" } else { "stop" });
        }
        self.state.is_playing = playing;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.state.is_paused != paused {
            log::debug!("Playback {}", if paused { "paused" } else { "resumed" });
        }
        self.state.is_paused = paused;
    }

    pub fn set_page_visible(&mut self, visible: bool) {
        self.state.is_page_visible = visible;
    }

    /// Intersection callback: `ratio` is the visible fraction of the surface
    pub fn set_intersection(&mut self, ratio: f32) {
        self.state.is_in_viewport = if self.viewport_threshold == 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.viewport_threshold
        };
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.state.is_ready = ready;
    }

    /// Called once per scheduled frame. Returns the gate for this frame and
    /// counts the frame when it is open.
    pub fn begin_frame(&mut self) -> bool {
        let open = self.state.should_animate();
        if open {
            self.state.frame_count += 1;
        }
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> PlaybackCoordinator {
        let mut playback = PlaybackCoordinator::new();
        playback.set_ready(true);
        playback
    }

    #[test]
    fn test_not_ready_blocks() {
        let playback = PlaybackCoordinator::new();
        assert!(!playback.should_animate());
    }

    #[test]
    fn test_all_inputs_open() {
        assert!(ready().should_animate());
    }

    #[test]
    fn test_each_input_closes_gate() {
        let toggles: [fn(&mut PlaybackCoordinator); 4] = [
            |p| p.set_playing(false),
            |p| p.set_paused(true),
            |p| p.set_intersection(0.0),
            |p| p.set_page_visible(false),
        ];
        for toggle in toggles {
            let mut playback = ready();
            toggle(&mut playback);
            assert!(!playback.should_animate());
        }
    }

    #[test]
    fn test_gate_matches_conjunction() {
        for bits in 0..16u8 {
            let mut playback = ready();
            let playing = bits & 1 != 0;
            let paused = bits & 2 != 0;
            let in_view = bits & 4 != 0;
            let visible = bits & 8 != 0;
            playback.set_playing(playing);
            playback.set_paused(paused);
            playback.set_intersection(if in_view { 0.5 } else { 0.0 });
            playback.set_page_visible(visible);
            assert_eq!(
                playback.should_animate(),
                playing && !paused && in_view && visible,
                "inputs {:04b}",
                bits
            );
        }
    }

    #[test]
    fn test_resume_is_immediate() {
        let mut playback = ready();
        playback.pause();
        assert!(!playback.begin_frame());
        playback.set_paused(false);
        assert!(playback.begin_frame());
    }

    #[test]
    fn test_frame_count_only_advances_when_open() {
        let mut playback = ready();
        playback.begin_frame();
        playback.set_page_visible(false);
        playback.begin_frame();
        playback.begin_frame();
        assert_eq!(playback.state().frame_count, 1);
    }

    #[test]
    fn test_custom_threshold() {
        let mut playback = PlaybackCoordinator::with_viewport_threshold(0.5);
        playback.set_ready(true);
        playback.set_intersection(0.25);
        assert!(!playback.should_animate());
        playback.set_intersection(0.5);
        assert!(playback.should_animate());
    }
}
