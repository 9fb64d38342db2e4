use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds since the clock was created (or last reset). Not clamped.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// fling the camera across the scene on the next frame. Elapsed time drives the
/// orbiting light and is left unclamped so animation stays on the wall clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets both the delta baseline and the elapsed origin.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last = now;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped_to_max_after_a_stall() {
        let mut clock = FrameClock::new();
        let later = clock.last + Duration::from_secs(3);
        let ft = clock.tick_at(later);
        assert!((ft.dt - 0.25).abs() < 1e-6);
        assert!((ft.elapsed - 3.0).abs() < 1e-3);
    }

    #[test]
    fn dt_is_clamped_to_min_for_back_to_back_ticks() {
        let mut clock = FrameClock::new();
        let same = clock.last;
        let ft = clock.tick_at(same);
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn frame_index_counts_up() {
        let mut clock = FrameClock::new();
        let base = clock.last;
        assert_eq!(clock.tick_at(base).frame_index, 0);
        assert_eq!(clock.tick_at(base + Duration::from_millis(16)).frame_index, 1);
        assert_eq!(clock.tick_at(base + Duration::from_millis(32)).frame_index, 2);
    }
}
