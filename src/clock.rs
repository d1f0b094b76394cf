//! Variable-timestep frame clock

use std::time::{Duration, Instant};

/// Shortest step handed to the simulation
pub const DT_MIN: Duration = Duration::from_micros(100);
/// Longest step; a stall (dragging the window, a debugger) is not replayed
pub const DT_MAX: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Seconds since the previous tick, clamped to `[DT_MIN, DT_MAX]`
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last).clamp(DT_MIN, DT_MAX);
        self.last = now;
        dt.as_secs_f32()
    }

    /// Seconds since the clock was created; drives shader animation
    pub fn elapsed(&self) -> f32 {
        self.last.saturating_duration_since(self.start).as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
