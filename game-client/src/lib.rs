pub mod api;
pub mod commands;
pub mod config;
pub mod render;
pub mod session;
pub mod transport;

pub use api::{ApiClient, ApiError, GameApi};
pub use commands::{Command, CommandError, parse_command};
pub use config::Config;
pub use render::{RenderTarget, TerminalRenderer};
pub use session::GameSession;
