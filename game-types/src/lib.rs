pub mod api;
pub mod errors;
pub mod game;
pub mod messages;
pub mod stats;
pub mod user;
pub mod wire;

// Re-export all types
pub use api::*;
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use stats::*;
pub use user::*;
pub use wire::{FrameError, decode_server_frame, encode_client_event};
