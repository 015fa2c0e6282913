//! Persistent connection to the game server.
//!
//! A [`Connector`] opens a [`Transport`] carrying text frames; a
//! [`connection::ConnectionHandle`] drives it on a background task, decoding
//! inbound frames into server events and encoding outbound client events.

use async_trait::async_trait;
use game_types::FrameError;

pub mod channel;
pub mod connection;
pub mod websocket;

pub use channel::{ChannelConnector, ChannelPeer, ChannelTransport};
pub use connection::{ConnectionHandle, ConnectionId, Inbound, InboundEvent};
pub use websocket::WebSocketConnector;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("receive failed: {0}")]
    Receive(String),
    #[error("connection closed")]
    Closed,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// A bidirectional stream of text frames.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// `None` once the peer has closed the stream.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new transport, presenting the session cookie if there is one.
    async fn connect(&self, cookie: Option<String>) -> Result<Box<dyn Transport>, TransportError>;
}
