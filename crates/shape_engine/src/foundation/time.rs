//! Time management utilities

use std::time::Instant;

/// Frame timer supplying elapsed time to the frame loop
///
/// Elapsed wall-clock time is multiplied by `time_scale` before it is
/// reported, so a game can express its speeds in its own time units.
#[derive(Debug)]
pub struct Timer {
    last_frame: Instant,
    time_scale: f32,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer reporting seconds
    pub fn new() -> Self {
        Self::with_time_scale(1.0)
    }

    /// Create a timer whose deltas are scaled by `time_scale`
    pub fn with_time_scale(time_scale: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            time_scale,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer from the wall clock (should be called once per frame)
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed.as_secs_f32())
    }

    /// Advance the timer by a fixed amount of unscaled time
    ///
    /// Used by headless runs and tests where frames are not tied to the clock.
    pub fn advance(&mut self, elapsed: f32) -> f32 {
        self.delta_time = elapsed * self.time_scale;
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the scaled time since the last frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total scaled time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
