use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,

    /// Seconds since the clock was created. Not clamped, never decreases.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. Elapsed time is measured from `start`
/// and is what animation should be driven by.
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

    /// Resets the delta baseline. Elapsed time keeps counting from creation.
    pub fn reset(&mut self) {
        self.last = Instant::now();
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
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        assert_eq!(clock.tick_at(start).frame_index, 0);
        assert_eq!(clock.tick_at(start).frame_index, 1);
        assert_eq!(clock.tick_at(start).frame_index, 2);
    }

    #[test]
    fn dt_is_clamped_but_elapsed_is_not() {
        let mut clock = FrameClock::new();
        let later = clock.start + Duration::from_secs(3);
        let ft = clock.tick_at(later);
        assert!((ft.dt - 0.25).abs() < 1e-6);
        assert!((ft.elapsed - 3.0).abs() < 1e-4);
    }

    #[test]
    fn zero_dt_is_raised_to_minimum() {
        let mut clock = FrameClock::new();
        let start = clock.start;
        let ft = clock.tick_at(start);
        assert!(ft.dt > 0.0);
        assert_eq!(ft.elapsed, 0.0);
    }

    #[test]
    fn reset_does_not_rewind_elapsed() {
        let mut clock = FrameClock::new();
        let t1 = clock.start + Duration::from_millis(500);
        clock.tick_at(t1);
        clock.reset();
        let t2 = t1 + Duration::from_millis(500);
        let ft = clock.tick_at(t2);
        assert!(ft.elapsed >= 1.0 - 1e-4);
    }
}
