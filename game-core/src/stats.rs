//! Local statistics reconciliation.
//!
//! The server owns the authoritative totals; this module only maintains the
//! cosmetic streak counters and the short list of recent results.

use chrono::{DateTime, Utc};
use game_types::{
    LocalStatsRecord, MatchOutcome, RECENT_RESULTS_LIMIT, RecentResult, ServerStats, UserId,
};

/// Decide the outcome of a finished match from the local point of view.
/// A missing winner is always a tie, whatever the scores say.
pub fn outcome_for(winner_id: Option<&UserId>, me: Option<&UserId>) -> MatchOutcome {
    match (winner_id, me) {
        (None, _) => MatchOutcome::Tie,
        (Some(winner), Some(me)) if winner == me => MatchOutcome::Win,
        _ => MatchOutcome::Loss,
    }
}

/// Apply exactly one match result to the record.
pub fn record_match_result(
    record: &mut LocalStatsRecord,
    outcome: MatchOutcome,
    label: impl Into<String>,
    finished_at: DateTime<Utc>,
) {
    match outcome {
        MatchOutcome::Win => {
            record.streak = record.streak.saturating_add(1);
            record.best_streak = record.best_streak.max(record.streak);
        }
        MatchOutcome::Loss => record.streak = 0,
        MatchOutcome::Tie => {}
    }

    record.recent_results.insert(
        0,
        RecentResult {
            outcome,
            label: label.into(),
            timestamp: finished_at.to_rfc3339(),
        },
    );
    record.recent_results.truncate(RECENT_RESULTS_LIMIT);
}

/// Bring a record read from storage back within its invariants.
pub fn normalize_record(mut record: LocalStatsRecord) -> LocalStatsRecord {
    record.recent_results.truncate(RECENT_RESULTS_LIMIT);
    record.best_streak = record.best_streak.max(record.streak);
    record
}

/// Server totals combined with the local record for the detailed view.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedStats {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub streak: u32,
    pub best_streak: u32,
    pub recent_results: Vec<RecentResult>,
}

impl DetailedStats {
    /// Missing server stats render as zeros rather than failing the view.
    pub fn combine(server: Option<&ServerStats>, local: &LocalStatsRecord) -> Self {
        let games = server.map(|s| s.total_games).unwrap_or(0);
        let wins = server.map(|s| s.total_wins).unwrap_or(0);
        let win_rate = server
            .and_then(|s| s.win_rate)
            .unwrap_or_else(|| computed_win_rate(games, wins));

        Self {
            games,
            wins,
            losses: games.saturating_sub(wins),
            win_rate,
            streak: local.streak,
            best_streak: local.best_streak,
            recent_results: local.recent_results.clone(),
        }
    }
}

fn computed_win_rate(games: u32, wins: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }
    (f64::from(wins) / f64::from(games) * 100.0).round()
}
