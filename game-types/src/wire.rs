//! Text-frame codec for the persistent connection.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`. Payload
//! shapes are lenient where the server is: a missing `data` is treated as an
//! empty object and a non-boolean `is_p1` is treated as absent.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ClientEvent, ServerEvent};

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

pub fn decode_server_frame(text: &str) -> Result<ServerEvent, FrameError> {
    let frame: RawFrame = serde_json::from_str(text).map_err(FrameError::Malformed)?;
    let event = frame.event;
    let mut data = match frame.data {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    let decoded = match event.as_str() {
        "connected" => ServerEvent::Connected(payload(&event, data)?),
        "not_authenticated" => ServerEvent::NotAuthenticated,
        "match_found" => {
            if let Some(fields) = data.as_object_mut() {
                if fields.get("is_p1").is_some_and(|v| !v.is_boolean()) {
                    fields.remove("is_p1");
                }
            }
            ServerEvent::MatchFound(payload(&event, data)?)
        }
        "timer_update" => ServerEvent::TimerUpdate(payload(&event, data)?),
        "score_update" => ServerEvent::ScoreUpdate(payload(&event, data)?),
        "guess_feedback" => ServerEvent::GuessFeedback(payload(&event, data)?),
        "guess_error" => ServerEvent::GuessError(payload(&event, data)?),
        "new_word" => ServerEvent::NewWord(payload(&event, data)?),
        "game_over" => ServerEvent::GameOver(payload(&event, data)?),
        "player_joined" => ServerEvent::PlayerJoined(payload(&event, data)?),
        _ => return Err(FrameError::UnknownEvent(event)),
    };

    Ok(decoded)
}

pub fn encode_client_event(event: &ClientEvent) -> Result<String, FrameError> {
    serde_json::to_string(event).map_err(FrameError::Malformed)
}

fn payload<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, FrameError> {
    serde_json::from_value(data).map_err(|source| FrameError::InvalidPayload {
        event: event.to_string(),
        source,
    })
}
