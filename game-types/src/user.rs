use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Server-assigned identifier. The server is free to send numbers or strings,
/// so the wire representation is kept and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum OpaqueId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpaqueId::Number(n) => write!(f, "{}", n),
            OpaqueId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserId(pub OpaqueId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomId(pub OpaqueId);

macro_rules! opaque_conversions {
    ($name:ident) => {
        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(OpaqueId::Number(value))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(OpaqueId::Text(value.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(OpaqueId::Text(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

opaque_conversions!(UserId);
opaque_conversions!(RoomId);

/// Account summary returned by the session check endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}
