//! In-process transport, used to run the session against a scripted server.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Connector, Transport, TransportError};

pub struct ChannelTransport {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: mpsc::UnboundedSender<String>,
}

/// The server side of a [`ChannelTransport`]. Dropping it closes the stream.
pub struct ChannelPeer {
    pub cookie: Option<String>,
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl ChannelPeer {
    pub fn push(&self, frame: impl Into<String>) {
        // A closed client just means the frame goes nowhere.
        let _ = self.to_client.send(frame.into());
    }

    pub async fn next_frame(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Frames the client has sent so far, without waiting.
    pub fn drain_frames(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.from_client.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

pub fn channel_pair(cookie: Option<String>) -> (ChannelTransport, ChannelPeer) {
    let (to_client, incoming) = mpsc::unbounded_channel();
    let (outgoing, from_client) = mpsc::unbounded_channel();

    (
        ChannelTransport { incoming, outgoing },
        ChannelPeer {
            cookie,
            to_client,
            from_client,
        },
    )
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.outgoing
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.incoming.close();
        Ok(())
    }
}

/// Hands the peer of every opened connection to whoever holds the receiver.
pub struct ChannelConnector {
    peers: mpsc::UnboundedSender<ChannelPeer>,
    refusing: AtomicBool,
}

impl ChannelConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChannelPeer>) {
        let (peers, peers_rx) = mpsc::unbounded_channel();
        (
            Self {
                peers,
                refusing: AtomicBool::new(false),
            },
            peers_rx,
        )
    }

    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self, cookie: Option<String>) -> Result<Box<dyn Transport>, TransportError> {
        if self.refusing.load(Ordering::SeqCst) {
            return Err(TransportError::Connect("connection refused".to_string()));
        }

        let (transport, peer) = channel_pair(cookie);
        self.peers
            .send(peer)
            .map_err(|_| TransportError::Connect("no server listening".to_string()))?;
        Ok(Box::new(transport))
    }
}
