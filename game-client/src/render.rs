use std::io::Write;

use game_core::{DetailedStats, Notice, NoticeLevel, TimerTier, UiEffect, View};
use game_types::{GuessRow, LetterColor, LocalStatsRecord, MatchOutcome, ServerStats};
use tracing::warn;

/// Where UI effects end up. Rendering never fails the session.
pub trait RenderTarget: Send {
    fn render(&mut self, effect: &UiEffect);

    /// Called when a transient notice's display time has passed.
    fn clear_notice(&mut self);
}

/// Line-oriented renderer for a terminal.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    notice: Option<Notice>,
    last_tier: Option<TimerTier>,
    play_enabled: bool,
    guess_enabled: bool,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            notice: None,
            last_tier: None,
            play_enabled: true,
            guess_enabled: false,
        }
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn play_enabled(&self) -> bool {
        self.play_enabled
    }

    pub fn guess_enabled(&self) -> bool {
        self.guess_enabled
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    fn show_view(&mut self, view: View) {
        let text = match view {
            View::Login => "== Login ==  register <user> <pass> | login <user> <pass> | quit",
            View::Lobby => "== Lobby ==  play | stats | reset-stats | logout | quit",
            View::Game => "== Match ==  type a 5-letter word, or guess <word>",
        };
        if view != View::Game {
            self.last_tier = None;
        }
        self.line(text);
    }

    fn timer(&mut self, display: &str, tier: TimerTier) {
        // One line per tier change and per half minute keeps the log readable.
        let changed = self.last_tier != Some(tier);
        if !changed && !display.ends_with(":00") && !display.ends_with(":30") {
            return;
        }
        self.last_tier = Some(tier);

        let marker = match tier {
            TimerTier::Calm => "",
            TimerTier::Warning => " (!)",
            TimerTier::Critical => " (!!)",
        };
        self.line(&format!("Time left: {}{}", display, marker));
    }

    fn board(&mut self, rows: &[GuessRow]) {
        if rows.is_empty() {
            return;
        }
        for row in rows {
            let tiles: Vec<String> = row.tiles.iter().map(|t| tile(t.letter, t.color)).collect();
            let suffix = if row.solved { "  solved" } else { "" };
            self.line(&format!("  {}{}", tiles.join(" "), suffix));
        }
    }

    fn local_stats(&mut self, record: &LocalStatsRecord) {
        self.line(&format!(
            "Streak: {} (best {})",
            record.streak, record.best_streak
        ));
        for result in &record.recent_results {
            self.line(&format!(
                "  {} {} {}",
                outcome_text(result.outcome),
                result.label,
                result.timestamp
            ));
        }
    }

    fn server_stats(&mut self, stats: &ServerStats) {
        let rate = stats
            .win_rate
            .map(|r| format!("{}%", r))
            .unwrap_or_else(|| "-".to_string());
        self.line(&format!(
            "Games: {}  Wins: {}  Win rate: {}",
            stats.total_games, stats.total_wins, rate
        ));
    }

    fn detailed_stats(&mut self, stats: &DetailedStats) {
        self.line("== Stats ==");
        self.line(&format!(
            "Games: {}  Wins: {}  Losses: {}  Win rate: {}%",
            stats.games, stats.wins, stats.losses, stats.win_rate
        ));
        self.line(&format!(
            "Current streak: {}  Best streak: {}",
            stats.streak, stats.best_streak
        ));
        if stats.recent_results.is_empty() {
            self.line("No recent matches");
        }
        for result in &stats.recent_results {
            self.line(&format!(
                "  {} {} {}",
                outcome_text(result.outcome),
                result.label,
                result.timestamp
            ));
        }
    }
}

impl<W: Write + Send> RenderTarget for TerminalRenderer<W> {
    fn render(&mut self, effect: &UiEffect) {
        match effect {
            UiEffect::Notice(notice) => {
                let tag = match notice.level {
                    NoticeLevel::Info => "info",
                    NoticeLevel::Success => "ok",
                    NoticeLevel::Error => "error",
                };
                self.line(&format!("[{}] {}", tag, notice.message));
                self.notice = Some(notice.clone());
            }
            UiEffect::ShowView(view) => self.show_view(*view),
            UiEffect::PlayEnabled(enabled) => self.play_enabled = *enabled,
            UiEffect::GuessInputEnabled(enabled) => self.guess_enabled = *enabled,
            UiEffect::ClearGuessInput => {}
            UiEffect::Scoreboard { mine, opponent } => {
                self.line(&format!("Score: you {} - {} opponent", mine, opponent))
            }
            UiEffect::Timer { display, tier } => self.timer(display, *tier),
            UiEffect::GuessBoard(rows) => self.board(rows),
            UiEffect::ServerStats(stats) => self.server_stats(stats),
            UiEffect::LocalStats(record) => self.local_stats(record),
            UiEffect::DetailedStats(stats) => self.detailed_stats(stats),
        }
    }

    fn clear_notice(&mut self) {
        self.notice = None;
    }
}

fn tile(letter: char, color: LetterColor) -> String {
    match color {
        LetterColor::Correct => format!("[{}]", letter),
        LetterColor::Present => format!("({})", letter),
        LetterColor::Miss => format!(" {} ", letter),
        LetterColor::Unknown => format!("?{}?", letter),
    }
}

fn outcome_text(outcome: MatchOutcome) -> &'static str {
    match outcome {
        MatchOutcome::Win => "WIN ",
        MatchOutcome::Loss => "LOSS",
        MatchOutcome::Tie => "TIE ",
    }
}
