use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds, clamped.
    pub dt: f32,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Lower clamp: keeps zero-dt out of downstream math on tight loops.
const DT_MIN: Duration = Duration::from_micros(100);

/// Upper clamp: keeps dt sane after a debugger pause or minimized stall.
const DT_MAX: Duration = Duration::from_millis(250);

/// Frame clock producing [`FrameTime`] snapshots.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
        }
    }

    /// Resets the baseline, e.g. after resuming from suspension.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new [`FrameTime`].
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).clamp(DT_MIN, DT_MAX);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
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
    fn frame_index_is_monotonic() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn dt_stays_within_clamps() {
        let mut clock = FrameClock::new();
        for _ in 0..10 {
            let ft = clock.tick();
            assert!(ft.dt >= DT_MIN.as_secs_f32());
            assert!(ft.dt <= DT_MAX.as_secs_f32());
        }
    }
}
