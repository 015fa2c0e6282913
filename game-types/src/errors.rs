use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Reasons a guess is refused before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GuessRejection {
    #[error("No active match")]
    NoActiveMatch,
    #[error("Guess must be 5 letters")]
    WrongLength { length: usize },
    #[error("Guess must contain only letters")]
    NotAlphabetic,
}

/// Reasons login or registration input is refused before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum CredentialRejection {
    #[error("Please enter username and password")]
    Missing,
    #[error("Username must be between 3 and 20 characters")]
    UsernameLength { length: usize },
    #[error("Password must be at least 4 characters")]
    PasswordTooShort,
}
