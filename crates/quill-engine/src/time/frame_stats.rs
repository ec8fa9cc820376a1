use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::debug;

pub const FRAME_STATS_WINDOW: usize = 180;
pub const JANK_THRESHOLD: Duration = Duration::from_nanos(16_666_666);
pub const FRAME_STATS_LOG_INTERVAL: Duration = Duration::from_secs(2);

/// Summary of the current frame window, in milliseconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStatsSnapshot {
    pub p50_ms: f64,
    pub p95_ms: f64,
    /// Longest run of consecutive janky frames, summed.
    pub worst_jank_burst_ms: f64,
    /// From the latest view transform change to the end of the last frame.
    pub transform_to_frame_ms: f64,
}

/// Rolling frame-time statistics for the stroke renderer.
#[derive(Debug, Clone)]
pub struct FrameStats {
    durations: VecDeque<Duration>,
    current_burst: Duration,
    worst_burst: Duration,
    last_transform: Option<Instant>,
    last_log: Option<Instant>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            durations: VecDeque::with_capacity(FRAME_STATS_WINDOW),
            current_burst: Duration::ZERO,
            worst_burst: Duration::ZERO,
            last_transform: None,
            last_log: None,
        }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn note_transform(&mut self, at: Instant) {
        self.last_transform = Some(at);
    }

    /// Records a frame that ran from `start` to `end`.
    ///
    /// Once the window is full, returns (and logs) a snapshot at most every
    /// [`FRAME_STATS_LOG_INTERVAL`].
    pub fn record(&mut self, start: Instant, end: Instant) -> Option<FrameStatsSnapshot> {
        let duration = end.saturating_duration_since(start);
        if self.durations.len() == FRAME_STATS_WINDOW {
            self.durations.pop_front();
        }
        self.durations.push_back(duration);

        if duration > JANK_THRESHOLD {
            self.current_burst += duration;
            self.worst_burst = self.worst_burst.max(self.current_burst);
        } else {
            self.current_burst = Duration::ZERO;
        }

        if self.durations.len() < FRAME_STATS_WINDOW {
            return None;
        }
        if self
            .last_log
            .is_some_and(|last| end.saturating_duration_since(last) < FRAME_STATS_LOG_INTERVAL)
        {
            return None;
        }
        self.last_log = Some(end);

        let stats = self.snapshot(end)?;
        debug!(
            "frame stats p50={:.2}ms p95={:.2}ms jank_burst={:.2}ms transform_to_frame={:.2}ms",
            stats.p50_ms, stats.p95_ms, stats.worst_jank_burst_ms, stats.transform_to_frame_ms
        );
        Some(stats)
    }

    /// `None` until a frame has been recorded.
    pub fn snapshot(&self, frame_end: Instant) -> Option<FrameStatsSnapshot> {
        if self.durations.is_empty() {
            return None;
        }
        let mut sorted: Vec<Duration> = self.durations.iter().copied().collect();
        sorted.sort_unstable();
        let at = |q: f64| sorted[((sorted.len() as f64 * q) as usize).min(sorted.len() - 1)];
        let latency = self
            .last_transform
            .map_or(Duration::ZERO, |t| frame_end.saturating_duration_since(t));
        Some(FrameStatsSnapshot {
            p50_ms: millis(at(0.5)),
            p95_ms: millis(at(0.95)),
            worst_jank_burst_ms: millis(self.worst_burst),
            transform_to_frame_ms: millis(latency),
        })
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Records `frames` back-to-back, returning the snapshots that were emitted.
    fn feed(stats: &mut FrameStats, clock: &mut Instant, frames: &[u64]) -> Vec<FrameStatsSnapshot> {
        let mut out = Vec::new();
        for &f in frames {
            let start = *clock;
            *clock += ms(f);
            out.extend(stats.record(start, *clock));
        }
        out
    }

    #[test]
    fn percentiles_over_the_window() {
        let mut stats = FrameStats::new();
        let mut clock = Instant::now();
        let frames: Vec<u64> = (1..=FRAME_STATS_WINDOW as u64).map(|i| if i <= 171 { 8 } else { 30 }).collect();
        let emitted = feed(&mut stats, &mut clock, &frames);
        assert_eq!(emitted.len(), 1);
        let s = emitted[0];
        assert!((s.p50_ms - 8.0).abs() < 1e-9);
        assert!((s.p95_ms - 30.0).abs() < 1e-9);
        assert!((s.worst_jank_burst_ms - 9.0 * 30.0).abs() < 1e-9);
    }

    #[test]
    fn jank_burst_resets_on_a_good_frame() {
        let mut stats = FrameStats::new();
        let mut clock = Instant::now();
        feed(&mut stats, &mut clock, &[20, 20, 5, 40, 5]);
        let s = stats.snapshot(clock).expect("snapshot");
        assert!((s.worst_jank_burst_ms - 40.0).abs() < 1e-9);
    }

    #[test]
    fn logging_is_rate_limited() {
        let mut stats = FrameStats::new();
        let mut clock = Instant::now();
        let full = vec![10u64; FRAME_STATS_WINDOW];
        assert_eq!(feed(&mut stats, &mut clock, &full).len(), 1);
        // 100 more frames of 10 ms is 1 s: still inside the interval.
        assert!(feed(&mut stats, &mut clock, &[10; 100]).is_empty());
        assert_eq!(feed(&mut stats, &mut clock, &[10; 100]).len(), 1);
    }

    #[test]
    fn transform_latency_measures_to_frame_end() {
        let mut stats = FrameStats::new();
        let start = Instant::now();
        stats.note_transform(start);
        stats.record(start, start + ms(12));
        let s = stats.snapshot(start + ms(12)).expect("snapshot");
        assert!((s.transform_to_frame_ms - 12.0).abs() < 1e-9);
        assert_eq!(stats.len(), 1);
    }
}
