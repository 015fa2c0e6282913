use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{AuthUser, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Login reply. Older servers nest the account under `user` instead of
/// returning `user_id`/`username` at the top level; both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LoginResponse {
    pub fn identity(&self) -> Option<(UserId, String)> {
        let nested = self.user.as_ref();
        let user_id = self
            .user_id
            .clone()
            .or_else(|| nested.map(|u| u.id.clone()))?;
        let username = self
            .username
            .clone()
            .or_else(|| nested.map(|u| u.username.clone()))
            .unwrap_or_default();
        Some((user_id, username))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QueueResponse {
    #[serde(default)]
    pub queued: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServerStats {
    #[serde(default)]
    pub total_games: u32,
    #[serde(default)]
    pub total_wins: u32,
    #[serde(default)]
    pub win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckAuthResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}
