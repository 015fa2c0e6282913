use std::fmt;
use std::time::Duration;

use game_types::{ClientEvent, ServerEvent, decode_server_frame, encode_client_event};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{Transport, TransportError};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Server(ServerEvent),
    /// The transport ended without being asked to.
    Closed,
}

/// Something that arrived on a specific connection. The id lets the session
/// drop events from a connection it has already replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub connection: ConnectionId,
    pub event: InboundEvent,
}

/// Owner of one live connection. Dropping the handle (or calling
/// [`ConnectionHandle::close`]) stops the background task.
pub struct ConnectionHandle {
    id: ConnectionId,
    outgoing: mpsc::UnboundedSender<ClientEvent>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    pub fn spawn(transport: Box<dyn Transport>, inbound: mpsc::UnboundedSender<Inbound>) -> Self {
        let id = ConnectionId::new();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(id, transport, outgoing_rx, inbound));
        info!("Connection {} opened", id);

        Self { id, outgoing, task }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn send(&self, event: ClientEvent) -> Result<(), TransportError> {
        self.outgoing
            .send(event)
            .map_err(|_| TransportError::Closed)
    }

    pub async fn close(self) {
        let Self { id, outgoing, task } = self;
        drop(outgoing);

        let abort = task.abort_handle();
        if tokio::time::timeout(CLOSE_TIMEOUT, task).await.is_err() {
            warn!("Connection {} did not close in time, aborting", id);
            abort.abort();
        }
        info!("Connection {} closed", id);
    }
}

async fn run_connection(
    id: ConnectionId,
    mut transport: Box<dyn Transport>,
    mut outgoing: mpsc::UnboundedReceiver<ClientEvent>,
    inbound: mpsc::UnboundedSender<Inbound>,
) {
    let emit = |event: InboundEvent| {
        // The session may already be gone; nothing left to tell.
        let _ = inbound.send(Inbound {
            connection: id,
            event,
        });
    };

    loop {
        tokio::select! {
            command = outgoing.recv() => {
                let Some(event) = command else {
                    debug!("Connection {} released by session", id);
                    if let Err(e) = transport.close().await {
                        debug!("Error closing connection {}: {}", id, e);
                    }
                    return;
                };

                let frame = match encode_client_event(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("Failed to encode {}: {}", event.name(), e);
                        continue;
                    }
                };
                debug!("-> {}", frame);

                if let Err(e) = transport.send(frame).await {
                    warn!("Failed to send on connection {}: {}", id, e);
                    emit(InboundEvent::Closed);
                    return;
                }
            }
            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => {
                        debug!("<- {}", text);
                        match decode_server_frame(&text) {
                            Ok(event) => emit(InboundEvent::Server(event)),
                            Err(e) => warn!("Dropping frame on connection {}: {}", id, e),
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Connection {} failed: {}", id, e);
                        emit(InboundEvent::Closed);
                        return;
                    }
                    None => {
                        info!("Connection {} closed by server", id);
                        emit(InboundEvent::Closed);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::channel::channel_pair;
    use game_types::RoomId;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (transport, mut peer) = channel_pair(None);
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::spawn(Box::new(transport), inbound_tx);

        peer.push(r#"{"event":"timer_update","data":{"time_left":12}}"#);
        let inbound = inbound_rx.recv().await.unwrap();
        assert_eq!(inbound.connection, handle.id());
        assert!(matches!(
            inbound.event,
            InboundEvent::Server(ServerEvent::TimerUpdate(_))
        ));

        handle
            .send(ClientEvent::JoinRoom {
                room: RoomId::from(3),
            })
            .unwrap();
        assert_eq!(
            peer.next_frame().await.unwrap(),
            r#"{"event":"join_room","data":{"room":3}}"#
        );
    }

    #[tokio::test]
    async fn test_bad_frames_are_dropped() {
        let (transport, peer) = channel_pair(None);
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
        let _handle = ConnectionHandle::spawn(Box::new(transport), inbound_tx);

        peer.push("garbage");
        peer.push(r#"{"event":"mystery","data":{}}"#);
        peer.push(r#"{"event":"not_authenticated"}"#);

        let inbound = inbound_rx.recv().await.unwrap();
        assert_eq!(
            inbound.event,
            InboundEvent::Server(ServerEvent::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn test_server_close_is_reported() {
        let (transport, peer) = channel_pair(None);
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::spawn(Box::new(transport), inbound_tx);

        drop(peer);

        let inbound = inbound_rx.recv().await.unwrap();
        assert_eq!(inbound.connection, handle.id());
        assert_eq!(inbound.event, InboundEvent::Closed);
    }

    #[tokio::test]
    async fn test_requested_close_is_silent() {
        let (transport, _peer) = channel_pair(None);
        let (inbound_tx, mut inbound_rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::spawn(Box::new(transport), inbound_tx);

        handle.close().await;

        assert!(inbound_rx.recv().await.is_none());
    }
}
