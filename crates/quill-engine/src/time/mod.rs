//! Frame timing: the per-window clock and rolling render statistics.

mod frame_clock;
mod frame_stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_stats::{FrameStats, FrameStatsSnapshot, FRAME_STATS_LOG_INTERVAL, FRAME_STATS_WINDOW, JANK_THRESHOLD};
