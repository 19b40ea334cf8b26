//! Frame-rate sampling for the window title.

use std::time::Duration;

/// Minimum time between two title updates (4 per second).
pub const TITLE_INTERVAL: Duration = Duration::from_millis(250);

/// One emitted sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub fps: f64,
    pub ms_per_frame: f64,
}

impl FrameStats {
    pub fn title(&self) -> String {
        format!(
            "  FPS: {:.3}  Frame Time: {:.3} (ms)",
            self.fps, self.ms_per_frame
        )
    }
}

/// Counts frames and emits an average once per [`TITLE_INTERVAL`].
///
/// Time is passed in by the caller (elapsed since loop start) so the counter
/// stays deterministic.
#[derive(Clone, Debug, Default)]
pub struct FpsCounter {
    previous: Duration,
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames counted towards the next sample.
    #[inline]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Register one frame at time `now`. Returns a sample when the interval
    /// has passed; the tally restarts with the current frame.
    pub fn tick(&mut self, now: Duration) -> Option<FrameStats> {
        let elapsed = now.saturating_sub(self.previous);
        let mut emitted = None;

        if elapsed > TITLE_INTERVAL {
            self.previous = now;
            let fps = f64::from(self.frames) / elapsed.as_secs_f64();
            let ms_per_frame = if fps > 0.0 { 1000.0 / fps } else { 0.0 };
            emitted = Some(FrameStats { fps, ms_per_frame });
            self.frames = 0;
        }

        self.frames += 1;
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sample_inside_interval() {
        let mut fps = FpsCounter::new();
        for ms in [0, 10, 100, 250] {
            assert!(fps.tick(Duration::from_millis(ms)).is_none());
        }
        assert_eq!(fps.frames(), 4);
    }

    #[test]
    fn tally_resets_on_every_emit() {
        let mut fps = FpsCounter::new();
        let mut now = Duration::ZERO;
        let step = Duration::from_millis(10);
        let mut emits = 0;

        for _ in 0..200 {
            now += step;
            let before = fps.frames();
            if let Some(stats) = fps.tick(now) {
                emits += 1;
                assert!(before > 0);
                assert!(stats.fps > 0.0);
                assert_eq!(fps.frames(), 1);
            }
        }
        assert!(emits >= 7);
    }

    #[test]
    fn sample_values_and_title() {
        let mut fps = FpsCounter::new();
        for i in 0..100 {
            assert!(fps.tick(Duration::from_millis(i * 2)).is_none());
        }
        let stats = fps.tick(Duration::from_millis(500)).expect("sample");
        assert!((stats.fps - 200.0).abs() < 1e-9);
        assert!((stats.ms_per_frame - 5.0).abs() < 1e-9);
        assert_eq!(stats.title(), "  FPS: 200.000  Frame Time: 5.000 (ms)");
    }
}
