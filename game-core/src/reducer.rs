//! Pure session reducer.
//!
//! `reduce` folds one server event into the session, `apply_action` folds one
//! local user action. Neither touches the network, storage or the screen: they
//! return the next state plus the effects the driver must carry out, in order.

use game_types::{
    ClientEvent, GameOver, GuessFeedback, GuessRejection, GuessRow, MatchFound, MatchOutcome,
    ServerEvent, UserId,
};
use tracing::{debug, info, warn};

use crate::effects::{Effect, Notice, UiEffect, View};
use crate::input_validation::normalize_guess;
use crate::session::{Identity, MatchState, Seat, SessionPhase, SessionState};
use crate::stats::outcome_for;
use crate::timer::{DEFAULT_MATCH_SECONDS, TimerTier, format_time};

/// Local user actions, after any HTTP round trip they depend on has completed.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalAction {
    LoggedIn { user_id: UserId, username: String },
    QueueJoined,
    QueueRejected { error: String },
    SubmitGuess { input: String },
    LoggedOut,
    /// The persistent connection closed without being asked to.
    ConnectionLost,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

pub fn reduce(state: SessionState, event: ServerEvent) -> Transition {
    if event.is_match_event() && state.phase != SessionPhase::InMatch {
        debug!(
            "Ignoring {} while in phase {:?}",
            event.name(),
            state.phase
        );
        return Transition::unchanged(state);
    }

    match event {
        ServerEvent::Connected(connected) => {
            match state.user_id() {
                Some(me) if *me != connected.user_id => warn!(
                    "Server reports user {} but session belongs to {}",
                    connected.user_id, me
                ),
                Some(_) => info!("Connected as user {}", connected.user_id),
                None => debug!("Ignoring connected event without a login"),
            }
            Transition::unchanged(state)
        }
        ServerEvent::PlayerJoined(joined) => {
            info!("Player joined: {}", joined.username);
            Transition::unchanged(state)
        }
        ServerEvent::NotAuthenticated => on_not_authenticated(state),
        ServerEvent::MatchFound(found) => on_match_found(state, found),
        ServerEvent::GameOver(over) => on_game_over(state, over),
        ServerEvent::TimerUpdate(update) => with_match(state, |m| {
            m.time_left = Some(update.time_left);
            vec![Effect::Ui(UiEffect::Timer {
                display: format_time(update.time_left),
                tier: TimerTier::for_remaining(update.time_left),
            })]
        }),
        ServerEvent::ScoreUpdate(scores) => with_match(state, |m| {
            m.scores = m.seat.split(scores);
            vec![Effect::Ui(UiEffect::Scoreboard {
                mine: m.scores.mine,
                opponent: m.scores.opponent,
            })]
        }),
        ServerEvent::GuessFeedback(feedback) => with_match(state, |m| on_guess_feedback(m, feedback)),
        ServerEvent::GuessError(error) => Transition {
            state,
            effects: vec![Effect::notice(Notice::error(error.error))],
        },
        ServerEvent::NewWord(word) => Transition {
            state,
            effects: vec![Effect::notice(Notice::success(word.message).transient())],
        },
    }
}

pub fn apply_action(state: SessionState, action: LocalAction) -> Transition {
    let mut state = state;

    let effects = match action {
        LocalAction::LoggedIn { user_id, username } => {
            state.identity = Some(Identity {
                user_id,
                username: username.clone(),
            });
            state.current_match = None;
            state.phase = SessionPhase::Authenticated;

            vec![
                Effect::notice(Notice::success(format!("Welcome, {}!", username))),
                Effect::Ui(UiEffect::ShowView(View::Lobby)),
                Effect::Ui(UiEffect::PlayEnabled(true)),
                Effect::RefreshServerStats,
                Effect::Connect,
            ]
        }
        LocalAction::QueueJoined => {
            if !state.is_logged_in() || state.phase == SessionPhase::InMatch {
                warn!("Ignoring queue confirmation in phase {:?}", state.phase);
                return Transition::unchanged(state);
            }
            state.phase = SessionPhase::Queued;

            vec![
                Effect::notice(Notice::info("Searching for opponent...")),
                Effect::Ui(UiEffect::PlayEnabled(false)),
            ]
        }
        LocalAction::QueueRejected { error } => vec![Effect::notice(Notice::error(error))],
        LocalAction::SubmitGuess { input } => submit_guess(&state, &input),
        LocalAction::LoggedOut => {
            state.clear_identity();
            state.phase = SessionPhase::Authenticated;

            vec![
                Effect::Disconnect,
                Effect::Ui(UiEffect::GuessInputEnabled(false)),
                Effect::Ui(UiEffect::ShowView(View::Login)),
                Effect::notice(Notice::info("Logged out successfully")),
            ]
        }
        LocalAction::ConnectionLost => {
            if !state.is_logged_in() {
                return Transition::unchanged(state);
            }
            state.current_match = None;
            state.phase = SessionPhase::Authenticated;

            vec![
                Effect::Ui(UiEffect::GuessInputEnabled(false)),
                Effect::Ui(UiEffect::PlayEnabled(true)),
                Effect::Ui(UiEffect::ShowView(View::Lobby)),
                Effect::notice(Notice::info("Connection to the game server was lost")),
            ]
        }
    };

    Transition { state, effects }
}

fn with_match(
    mut state: SessionState,
    update: impl FnOnce(&mut MatchState) -> Vec<Effect>,
) -> Transition {
    let effects = match state.current_match.as_mut() {
        Some(current) => update(current),
        None => {
            warn!("In-match event without match state");
            Vec::new()
        }
    };
    Transition { state, effects }
}

fn on_not_authenticated(mut state: SessionState) -> Transition {
    warn!("Server rejected the connection as unauthenticated");
    state.clear_identity();
    state.phase = SessionPhase::Disconnected;

    Transition {
        state,
        effects: vec![
            Effect::Disconnect,
            Effect::Ui(UiEffect::GuessInputEnabled(false)),
            Effect::Ui(UiEffect::ShowView(View::Login)),
            Effect::notice(Notice::error("Please login first")),
        ],
    }
}

fn on_match_found(mut state: SessionState, found: MatchFound) -> Transition {
    if !state.is_logged_in() {
        debug!("Ignoring match_found without a login");
        return Transition::unchanged(state);
    }
    if let Some(current) = state.current_match.as_ref() {
        warn!(
            "Ignoring match_found for room {} while playing in room {}",
            found.room, current.room
        );
        return Transition::unchanged(state);
    }

    info!("Match found in room {} (is_p1: {:?})", found.room, found.is_p1);
    let room = found.room;
    state.current_match = Some(MatchState::new(room.clone(), Seat::from_flag(found.is_p1)));
    state.phase = SessionPhase::InMatch;

    Transition {
        state,
        effects: vec![
            Effect::notice(Notice::success("Match found! Starting game...")),
            Effect::Send(ClientEvent::JoinRoom { room }),
            Effect::Ui(UiEffect::ShowView(View::Game)),
            Effect::Ui(UiEffect::PlayEnabled(true)),
            Effect::Ui(UiEffect::Scoreboard {
                mine: 0,
                opponent: 0,
            }),
            Effect::Ui(UiEffect::Timer {
                display: format_time(DEFAULT_MATCH_SECONDS),
                tier: TimerTier::Calm,
            }),
            Effect::Ui(UiEffect::GuessBoard(Vec::new())),
            Effect::Ui(UiEffect::ClearGuessInput),
            Effect::Ui(UiEffect::GuessInputEnabled(true)),
        ],
    }
}

fn on_guess_feedback(current: &mut MatchState, feedback: GuessFeedback) -> Vec<Effect> {
    let row = GuessRow::from_feedback(&feedback.guess, &feedback.colors, feedback.solved);
    current.history.push(row);

    let mut effects = vec![Effect::Ui(UiEffect::GuessBoard(current.history.rows()))];
    if feedback.solved {
        effects.push(Effect::notice(
            Notice::success("Correct! +1 point").transient(),
        ));
    }
    effects
}

fn on_game_over(mut state: SessionState, over: GameOver) -> Transition {
    let Some(finished) = state.current_match.take() else {
        warn!("game_over without match state");
        return Transition::unchanged(state);
    };

    let scores = finished.seat.split(over.final_scores);
    let outcome = outcome_for(over.winner_id.as_ref(), state.user_id());
    state.phase = SessionPhase::MatchOver;
    info!(
        "Match in room {} finished {:?} ({})",
        finished.room,
        outcome,
        scores.label()
    );

    let notice = match outcome {
        MatchOutcome::Tie => Notice::info("It's a tie!"),
        MatchOutcome::Win => Notice::success("You won! Great job!"),
        MatchOutcome::Loss => Notice::info("You lost. Better luck next time!"),
    };

    Transition {
        state,
        effects: vec![
            Effect::Ui(UiEffect::GuessInputEnabled(false)),
            Effect::Ui(UiEffect::PlayEnabled(true)),
            Effect::Ui(UiEffect::Scoreboard {
                mine: scores.mine,
                opponent: scores.opponent,
            }),
            Effect::notice(notice),
            Effect::RecordResult {
                outcome,
                label: scores.label(),
            },
            Effect::RefreshServerStats,
        ],
    }
}

fn submit_guess(state: &SessionState, input: &str) -> Vec<Effect> {
    let room = match state.room() {
        Some(room) if state.accepts_guesses() => room.clone(),
        _ => return vec![rejected(GuessRejection::NoActiveMatch)],
    };

    match normalize_guess(input) {
        Ok(guess) => vec![
            Effect::Send(ClientEvent::SubmitGuess { room, guess }),
            Effect::Ui(UiEffect::ClearGuessInput),
        ],
        Err(rejection) => vec![rejected(rejection)],
    }
}

fn rejected(rejection: GuessRejection) -> Effect {
    Effect::notice(Notice::error(rejection.to_string()).transient())
}
