#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use game_client::api::{ApiError, GameApi};
use game_client::render::RenderTarget;
use game_client::session::GameSession;
use game_client::transport::{ChannelConnector, ChannelPeer, Inbound};
use game_core::{Notice, UiEffect};
use game_persistence::{KeyChange, KeyValueStore, LocalStatsRepository, MemoryKeyValueStore};
use game_types::{
    AuthUser, CheckAuthResponse, Credentials, LoginResponse, QueueResponse, RegisterResponse,
    ServerStats, UserId,
};
use tokio::sync::mpsc;

pub const MY_ID: i64 = 42;
pub const OPPONENT_ID: i64 = 43;
const WAIT: Duration = Duration::from_secs(2);

/// Scripted stand-in for the HTTP server. `None` responses fail with a 500.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<&'static str>>,
    pub register: Mutex<Option<RegisterResponse>>,
    pub login: Mutex<Option<LoginResponse>>,
    pub queue: Mutex<Option<QueueResponse>>,
    pub stats: Mutex<Option<ServerStats>>,
    pub check_auth: Mutex<Option<CheckAuthResponse>>,
    pub cookie: Mutex<Option<String>>,
    pub logout_fails: AtomicBool,
}

impl FakeApi {
    /// A server that accepts alice and puts her in the queue.
    pub fn accepting() -> Self {
        let api = Self::default();
        *api.register.lock().unwrap() = Some(RegisterResponse {
            success: true,
            error: None,
        });
        *api.login.lock().unwrap() = Some(LoginResponse {
            success: true,
            user_id: Some(UserId::from(MY_ID)),
            username: Some("alice".to_string()),
            user: None,
            error: None,
        });
        *api.queue.lock().unwrap() = Some(QueueResponse {
            queued: true,
            error: None,
        });
        *api.stats.lock().unwrap() = Some(ServerStats {
            total_games: 10,
            total_wins: 4,
            win_rate: Some(40.0),
        });
        *api.check_auth.lock().unwrap() = Some(CheckAuthResponse {
            authenticated: false,
            user: None,
        });
        *api.cookie.lock().unwrap() = Some("session=abc123".to_string());
        api
    }

    pub fn resumable(user: AuthUser) -> Self {
        let api = Self::accepting();
        *api.check_auth.lock().unwrap() = Some(CheckAuthResponse {
            authenticated: true,
            user: Some(user),
        });
        api
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn respond<T: Clone>(&self, call: &'static str, slot: &Mutex<Option<T>>) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(call);
        slot.lock().unwrap().clone().ok_or(ApiError::Status(500))
    }
}

#[async_trait]
impl GameApi for FakeApi {
    async fn register(&self, _credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        self.respond("register", &self.register)
    }

    async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.respond("login", &self.login)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push("logout");
        if self.logout_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Status(500));
        }
        Ok(())
    }

    async fn join_queue(&self) -> Result<QueueResponse, ApiError> {
        self.respond("queue", &self.queue)
    }

    async fn fetch_stats(&self) -> Result<ServerStats, ApiError> {
        self.respond("stats", &self.stats)
    }

    async fn check_auth(&self) -> Result<CheckAuthResponse, ApiError> {
        self.respond("check_auth", &self.check_auth)
    }

    fn session_cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }
}

/// Keeps every effect it is asked to render.
#[derive(Default)]
pub struct RecordingRenderer {
    pub effects: Vec<UiEffect>,
    pub cleared: usize,
}

impl RecordingRenderer {
    pub fn notices(&self) -> Vec<Notice> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                UiEffect::Notice(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices().pop()
    }

    pub fn has_notice(&self, message: &str) -> bool {
        self.notices().iter().any(|n| n.message == message)
    }
}

impl RenderTarget for RecordingRenderer {
    fn render(&mut self, effect: &UiEffect) {
        self.effects.push(effect.clone());
    }

    fn clear_notice(&mut self) {
        self.cleared += 1;
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("disk unavailable")
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk unavailable")
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk unavailable")
    }

    async fn apply(&self, _changes: Vec<KeyChange>) -> anyhow::Result<()> {
        anyhow::bail!("disk unavailable")
    }
}

/// A session wired to a fake API, an in-memory store and channel transports.
pub struct TestClient<S: KeyValueStore = MemoryKeyValueStore> {
    pub session: GameSession<S, RecordingRenderer>,
    pub inbound: mpsc::UnboundedReceiver<Inbound>,
    pub peers: mpsc::UnboundedReceiver<ChannelPeer>,
    pub api: Arc<FakeApi>,
    pub connector: Arc<ChannelConnector>,
}

impl TestClient<MemoryKeyValueStore> {
    pub fn new(api: FakeApi) -> Self {
        Self::with_store(api, MemoryKeyValueStore::new())
    }
}

impl<S: KeyValueStore> TestClient<S> {
    pub fn with_store(api: FakeApi, store: S) -> Self {
        let api = Arc::new(api);
        let (connector, peers) = ChannelConnector::new();
        let connector = Arc::new(connector);

        let (session, inbound) = GameSession::new(
            api.clone(),
            connector.clone(),
            LocalStatsRepository::new(store),
            RecordingRenderer::default(),
            Duration::from_millis(2000),
        );

        Self {
            session,
            inbound,
            peers,
            api,
            connector,
        }
    }

    pub fn renderer(&self) -> &RecordingRenderer {
        self.session.renderer()
    }

    /// Logs in as alice and returns the server side of the new connection.
    pub async fn login(&mut self) -> ChannelPeer {
        self.session.login("alice", "secret").await;
        self.next_peer().await
    }

    pub async fn next_peer(&mut self) -> ChannelPeer {
        tokio::time::timeout(WAIT, self.peers.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("connector dropped")
    }

    /// Pushes a frame from the server and lets the session handle it.
    pub async fn deliver(&mut self, peer: &ChannelPeer, frame: &str) {
        peer.push(frame);
        self.pump().await;
    }

    /// Hands the next inbound event to the session.
    pub async fn pump(&mut self) {
        let inbound = tokio::time::timeout(WAIT, self.inbound.recv())
            .await
            .expect("timed out waiting for an inbound event")
            .expect("inbound channel closed");
        self.session.handle_inbound(inbound).await;
    }

    /// Logs in, queues and enters a match in `room`.
    pub async fn start_match(&mut self, room: &str, is_p1: bool) -> ChannelPeer {
        let mut peer = self.login().await;
        self.session.play().await;
        self.deliver(
            &peer,
            &format!(
                r#"{{"event":"match_found","data":{{"room":"{}","is_p1":{}}}}}"#,
                room, is_p1
            ),
        )
        .await;
        // join_room
        next_frame(&mut peer).await;
        peer
    }
}

pub async fn next_frame(peer: &mut ChannelPeer) -> String {
    tokio::time::timeout(WAIT, peer.next_frame())
        .await
        .expect("timed out waiting for a frame")
        .expect("connection closed")
}
