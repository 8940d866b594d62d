//! Frame timing and tick scheduling.
//!
//! [`Time`] measures wall-clock frames. [`TickClock`] turns a frame's delta
//! into a number of simulation ticks according to the configured
//! [`TickMode`]. Ticks are always whole unit steps; only how many run per
//! frame changes between modes.
//!
//! ```ignore
//! let mut time = Time::new();
//! let mut clock = TickClock::new(config.tick);
//!
//! // Each frame:
//! let (_, delta) = time.update();
//! field.advance(clock.ticks_due(delta));
//! ```

use crate::config::TickMode;
use std::time::{Duration, Instant};

/// Wall-clock timing for the render loop.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Time spent paused, excluded from `elapsed`.
    pause_elapsed: Duration,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` in seconds.
    pub fn update(&mut self) -> (f32, f32) {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> (f32, f32) {
        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = (now.duration_since(self.start).saturating_sub(self.pause_elapsed)).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, `delta()` is 0 and `elapsed()` stops.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides how many ticks each rendered frame runs.
#[derive(Debug, Clone)]
pub struct TickClock {
    mode: TickMode,
    accumulator: f32,
}

impl TickClock {
    pub fn new(mode: TickMode) -> Self {
        Self {
            mode,
            accumulator: 0.0,
        }
    }

    #[inline]
    pub fn mode(&self) -> TickMode {
        self.mode
    }

    /// Ticks to run for a frame that took `delta_secs`.
    ///
    /// In fixed-rate mode any backlog beyond `max_catch_up` ticks is dropped
    /// so a stalled window does not fast-forward the field.
    pub fn ticks_due(&mut self, delta_secs: f32) -> u32 {
        match self.mode {
            TickMode::PerFrame => 1,
            TickMode::FixedRate { hz, max_catch_up } => {
                let step = 1.0 / hz;
                if delta_secs.is_finite() && delta_secs > 0.0 {
                    self.accumulator += delta_secs;
                }
                let due = (self.accumulator / step).floor();
                if due >= max_catch_up as f32 {
                    self.accumulator = 0.0;
                    return max_catch_up;
                }
                let due = due as u32;
                self.accumulator -= due as f32 * step;
                due
            }
        }
    }

    /// Forget any accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
