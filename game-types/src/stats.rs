use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of finished matches remembered locally.
pub const RECENT_RESULTS_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum MatchOutcome {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecentResult {
    pub outcome: MatchOutcome,
    pub label: String,
    pub timestamp: String, // ISO 8601 string
}

/// Cosmetic statistics kept on this machine, independent of the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocalStatsRecord {
    pub streak: u32,
    pub best_streak: u32,
    /// Most recent first, never longer than `RECENT_RESULTS_LIMIT`.
    pub recent_results: Vec<RecentResult>,
}
