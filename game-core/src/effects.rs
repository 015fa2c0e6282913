use game_types::{ClientEvent, GuessRow, LocalStatsRecord, MatchOutcome, ServerStats};

use crate::stats::DetailedStats;
use crate::timer::TimerTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    /// Transient notices are dismissed by the front end after a fixed delay.
    pub transient: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
            transient: false,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
            transient: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
            transient: false,
        }
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Lobby,
    Game,
}

/// Structured UI changes. The render target decides how (and whether) each
/// one is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    Notice(Notice),
    ShowView(View),
    PlayEnabled(bool),
    GuessInputEnabled(bool),
    ClearGuessInput,
    Scoreboard { mine: i32, opponent: i32 },
    Timer { display: String, tier: TimerTier },
    GuessBoard(Vec<GuessRow>),
    ServerStats(ServerStats),
    LocalStats(LocalStatsRecord),
    DetailedStats(DetailedStats),
}

/// Work the reducer asks the session driver to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Ui(UiEffect),
    /// Open the persistent connection, replacing any live one.
    Connect,
    /// Tear down the persistent connection.
    Disconnect,
    Send(ClientEvent),
    RecordResult { outcome: MatchOutcome, label: String },
    RefreshServerStats,
}

impl Effect {
    pub fn notice(notice: Notice) -> Self {
        Effect::Ui(UiEffect::Notice(notice))
    }
}
