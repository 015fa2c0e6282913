use std::collections::VecDeque;

use game_types::{GUESS_HISTORY_LIMIT, GuessRow, RoomId, ScorePair, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Disconnected,
    Authenticated,
    Queued,
    InMatch,
    MatchOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

/// Which server slot this client occupies in the current match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Seat {
    PlayerOne,
    PlayerTwo,
    /// Not declared by the server. Treated like `PlayerOne` when mapping scores.
    #[default]
    Unknown,
}

impl Seat {
    pub fn from_flag(is_p1: Option<bool>) -> Self {
        match is_p1 {
            Some(true) => Seat::PlayerOne,
            Some(false) => Seat::PlayerTwo,
            None => Seat::Unknown,
        }
    }

    pub fn is_player_one(&self) -> Option<bool> {
        match self {
            Seat::PlayerOne => Some(true),
            Seat::PlayerTwo => Some(false),
            Seat::Unknown => None,
        }
    }

    pub fn split(&self, scores: ScorePair) -> ScoreView {
        match self {
            Seat::PlayerTwo => ScoreView {
                mine: scores.p2,
                opponent: scores.p1,
            },
            Seat::PlayerOne | Seat::Unknown => ScoreView {
                mine: scores.p1,
                opponent: scores.p2,
            },
        }
    }
}

/// Scores from this client's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreView {
    pub mine: i32,
    pub opponent: i32,
}

impl ScoreView {
    pub fn label(&self) -> String {
        format!("{}-{}", self.mine, self.opponent)
    }
}

/// Bounded board of evaluated guesses, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessHistory {
    rows: VecDeque<GuessRow>,
}

impl GuessHistory {
    pub fn push(&mut self, row: GuessRow) {
        self.rows.push_front(row);
        self.rows.truncate(GUESS_HISTORY_LIMIT);
    }

    pub fn rows(&self) -> Vec<GuessRow> {
        self.rows.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn newest(&self) -> Option<&GuessRow> {
        self.rows.front()
    }
}

/// Per-match state, created on `match_found` and dropped on `game_over`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub room: RoomId,
    pub seat: Seat,
    pub scores: ScoreView,
    pub time_left: Option<i64>,
    pub history: GuessHistory,
    pub input_enabled: bool,
}

impl MatchState {
    pub fn new(room: RoomId, seat: Seat) -> Self {
        Self {
            room,
            seat,
            scores: ScoreView::default(),
            time_left: None,
            history: GuessHistory::default(),
            input_enabled: true,
        }
    }
}

/// Everything the client knows about its login and current match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub current_match: Option<MatchState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.identity.as_ref().map(|i| &i.user_id)
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.current_match.as_ref().map(|m| &m.room)
    }

    pub fn seat(&self) -> Seat {
        self.current_match
            .as_ref()
            .map(|m| m.seat)
            .unwrap_or_default()
    }

    /// The play control is off while a queue request is pending.
    pub fn is_queued(&self) -> bool {
        self.phase == SessionPhase::Queued
    }

    /// Guesses may only be sent while a room is assigned and input is open.
    pub fn accepts_guesses(&self) -> bool {
        self.phase == SessionPhase::InMatch
            && self.current_match.as_ref().is_some_and(|m| m.input_enabled)
    }

    /// Drops identity and match, keeping nothing from the previous login.
    pub(crate) fn clear_identity(&mut self) {
        self.identity = None;
        self.current_match = None;
    }
}
