#![allow(dead_code)]

use game_core::{
    Effect, LocalAction, Notice, NoticeLevel, SessionState, Transition, UiEffect, apply_action,
    reduce,
};
use game_types::{
    GameOver, GuessFeedback, LetterColor, MatchFound, RoomId, ScorePair, ServerEvent, UserId,
    WORD_LENGTH,
};

pub const TEST_USER_ID: i64 = 7;
pub const OPPONENT_ID: i64 = 8;

/// A session that has completed login.
pub fn logged_in_session() -> SessionState {
    apply_action(
        SessionState::new(),
        LocalAction::LoggedIn {
            user_id: UserId::from(TEST_USER_ID),
            username: "alice".to_string(),
        },
    )
    .state
}

/// A session that has joined `room` in the given seat.
pub fn in_match_session(room: &str, is_p1: Option<bool>) -> SessionState {
    reduce(logged_in_session(), match_found(room, is_p1)).state
}

pub fn match_found(room: &str, is_p1: Option<bool>) -> ServerEvent {
    ServerEvent::MatchFound(MatchFound {
        room: RoomId::from(room),
        is_p1,
    })
}

pub fn feedback(guess: &str, solved: bool) -> ServerEvent {
    let color = if solved {
        LetterColor::Correct
    } else {
        LetterColor::Miss
    };
    ServerEvent::GuessFeedback(GuessFeedback {
        guess: guess.to_string(),
        colors: vec![color; WORD_LENGTH],
        solved,
    })
}

pub fn game_over(p1: i32, p2: i32, winner: Option<i64>) -> ServerEvent {
    ServerEvent::GameOver(GameOver {
        final_scores: ScorePair { p1, p2 },
        winner_id: winner.map(UserId::from),
    })
}

/// Feed a sequence of server events through the reducer, keeping every effect.
pub fn reduce_all(
    state: SessionState,
    events: impl IntoIterator<Item = ServerEvent>,
) -> (SessionState, Vec<Effect>) {
    events
        .into_iter()
        .fold((state, Vec::new()), |(state, mut effects), event| {
            let Transition {
                state,
                effects: more,
            } = reduce(state, event);
            effects.extend(more);
            (state, effects)
        })
}

pub fn notices(effects: &[Effect]) -> Vec<&Notice> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Ui(UiEffect::Notice(notice)) => Some(notice),
            _ => None,
        })
        .collect()
}

/// Asserts that exactly one notice was produced, with the given text and level.
pub fn assert_single_notice(effects: &[Effect], message: &str, level: NoticeLevel) {
    let found = notices(effects);
    assert_eq!(found.len(), 1, "Expected one notice, got {:?}", found);
    assert_eq!(found[0].message, message);
    assert_eq!(found[0].level, level);
}

pub fn record_results(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::RecordResult { .. }))
        .count()
}
