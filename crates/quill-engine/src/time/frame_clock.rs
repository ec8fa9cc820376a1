use std::time::{Duration, Instant};

/// Timing for one rendered frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped.
    pub dt: f32,
    /// When this frame started.
    pub now: Instant,
    pub frame_index: u64,
    /// True for the first frame after an idle stretch longer than the clamp.
    pub resumed: bool,
}

/// Per-window frame clock.
///
/// With on-demand redraw the gap between frames can be seconds long; those
/// gaps are clamped to `dt_max` and flagged as `resumed` so animations and
/// frame statistics do not treat them as a slow frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let (dt, resumed) = match self.last {
            Some(last) => {
                let raw = now.saturating_duration_since(last);
                (raw.clamp(self.dt_min, self.dt_max), raw > self.dt_max)
            }
            None => (self.dt_min, true),
        };
        self.last = Some(now);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
            resumed,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_counts_as_resumed() {
        let mut clock = FrameClock::new();
        let ft = clock.tick();
        assert!(ft.resumed);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn idle_gaps_are_clamped_and_flagged() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);

        let ft = clock.tick_at(t0 + Duration::from_millis(16));
        assert!(!ft.resumed);
        assert!((ft.dt - 0.016).abs() < 1e-6);

        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert!(ft.resumed);
        assert!((ft.dt - 0.25).abs() < 1e-6);
        assert_eq!(ft.frame_index, 2);
    }
}
