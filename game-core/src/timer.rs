/// Remaining time at or below which the clock turns to the warning colour.
pub const WARNING_THRESHOLD_SECONDS: i64 = 60;
/// Remaining time at or below which the clock turns to the critical colour.
pub const CRITICAL_THRESHOLD_SECONDS: i64 = 30;
/// Length of a match as shown before the first tick arrives.
pub const DEFAULT_MATCH_SECONDS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTier {
    Calm,
    Warning,
    Critical,
}

impl TimerTier {
    pub fn for_remaining(seconds: i64) -> Self {
        if seconds <= CRITICAL_THRESHOLD_SECONDS {
            TimerTier::Critical
        } else if seconds <= WARNING_THRESHOLD_SECONDS {
            TimerTier::Warning
        } else {
            TimerTier::Calm
        }
    }
}

/// Formats seconds as `m:ss`. Negative values clamp to `0:00`.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
