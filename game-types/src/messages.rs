use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{LetterColor, RoomId, ScorePair, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Connected {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MatchFound {
    pub room: RoomId,
    /// `None` when the server omits the flag or sends something other than a bool.
    #[serde(default)]
    pub is_p1: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimerUpdate {
    pub time_left: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessFeedback {
    pub guess: String,
    #[serde(default)]
    #[ts(type = "Array<string>")]
    pub colors: Vec<LetterColor>,
    #[serde(default)]
    pub solved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessError {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewWord {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameOver {
    #[serde(default)]
    pub final_scores: ScorePair,
    #[serde(default)]
    pub winner_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerJoined {
    pub username: String,
}

/// Everything the server pushes over the persistent connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected(Connected),
    NotAuthenticated,
    MatchFound(MatchFound),
    TimerUpdate(TimerUpdate),
    ScoreUpdate(ScorePair),
    GuessFeedback(GuessFeedback),
    GuessError(GuessError),
    NewWord(NewWord),
    GameOver(GameOver),
    PlayerJoined(PlayerJoined),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected(_) => "connected",
            ServerEvent::NotAuthenticated => "not_authenticated",
            ServerEvent::MatchFound(_) => "match_found",
            ServerEvent::TimerUpdate(_) => "timer_update",
            ServerEvent::ScoreUpdate(_) => "score_update",
            ServerEvent::GuessFeedback(_) => "guess_feedback",
            ServerEvent::GuessError(_) => "guess_error",
            ServerEvent::NewWord(_) => "new_word",
            ServerEvent::GameOver(_) => "game_over",
            ServerEvent::PlayerJoined(_) => "player_joined",
        }
    }

    /// Events that only make sense while a match is running.
    pub fn is_match_event(&self) -> bool {
        matches!(
            self,
            ServerEvent::TimerUpdate(_)
                | ServerEvent::ScoreUpdate(_)
                | ServerEvent::GuessFeedback(_)
                | ServerEvent::GuessError(_)
                | ServerEvent::NewWord(_)
                | ServerEvent::GameOver(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[ts(export)]
pub enum ClientEvent {
    JoinRoom { room: RoomId },
    SubmitGuess { room: RoomId, guess: String },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom { .. } => "join_room",
            ClientEvent::SubmitGuess { .. } => "submit_guess",
        }
    }
}
