//! Session driver.
//!
//! Owns the session state and carries out the effects the reducer returns:
//! HTTP calls, the persistent connection, local stats and rendering. Every
//! input is handled to completion before the next one, so the reducer never
//! sees interleaved events.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use game_core::{
    DetailedStats, Effect, LocalAction, Notice, SessionState, Transition, UiEffect, View,
    apply_action, reduce, validate_login, validate_registration,
};
use game_persistence::{KeyValueStore, LocalStatsRepository};
use game_types::{ClientEvent, LocalStatsRecord, MatchOutcome};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::GameApi;
use crate::render::RenderTarget;
use crate::transport::{ConnectionHandle, Connector, Inbound, InboundEvent};

pub struct GameSession<S, R> {
    api: Arc<dyn GameApi>,
    connector: Arc<dyn Connector>,
    stats: LocalStatsRepository<S>,
    renderer: R,
    state: SessionState,
    connection: Option<ConnectionHandle>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    notice_dismiss: Duration,
    notice_deadline: Option<Instant>,
}

impl<S: KeyValueStore, R: RenderTarget> GameSession<S, R> {
    /// Returns the session and the receiver its connections report on. The
    /// caller feeds everything from that receiver back into
    /// [`GameSession::handle_inbound`].
    pub fn new(
        api: Arc<dyn GameApi>,
        connector: Arc<dyn Connector>,
        stats: LocalStatsRepository<S>,
        renderer: R,
        notice_dismiss: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Inbound>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let session = Self {
            api,
            connector,
            stats,
            renderer,
            state: SessionState::new(),
            connection: None,
            inbound_tx,
            notice_dismiss,
            notice_deadline: None,
        };

        (session, inbound_rx)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn notice_deadline(&self) -> Option<Instant> {
        self.notice_deadline
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Shows the login view and local stats, then resumes a server session
    /// if the cookie jar still holds a valid one.
    pub async fn start(&mut self) {
        self.render(UiEffect::ShowView(View::Login));
        let record = self.load_local_stats().await;
        self.render(UiEffect::LocalStats(record));

        match self.api.check_auth().await {
            Ok(check) if check.authenticated => {
                if let Some(user) = check.user {
                    info!("Resuming session for {}", user.username);
                    self.dispatch(LocalAction::LoggedIn {
                        user_id: user.id,
                        username: user.username,
                    })
                    .await;
                }
            }
            Ok(_) => debug!("No existing session"),
            Err(e) => debug!("Session check failed: {}", e),
        }
    }

    pub async fn register(&mut self, username: &str, password: &str) {
        let credentials = match validate_registration(username, password) {
            Ok(credentials) => credentials,
            Err(rejection) => return self.notice(Notice::error(rejection.to_string())),
        };

        match self.api.register(&credentials).await {
            Ok(response) if response.success => {
                info!("Registered {}", credentials.username);
                self.notice(Notice::success("Account created! Please login"));
            }
            Ok(response) => self.notice(Notice::error(
                response
                    .error
                    .unwrap_or_else(|| "Registration failed".to_string()),
            )),
            Err(e) => {
                warn!("Registration request failed: {}", e);
                self.notice(Notice::error(format!(
                    "Network error during registration: {}",
                    e
                )));
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        let credentials = match validate_login(username, password) {
            Ok(credentials) => credentials,
            Err(rejection) => return self.notice(Notice::error(rejection.to_string())),
        };

        match self.api.login(&credentials).await {
            Ok(response) if response.success => match response.identity() {
                Some((user_id, username)) => {
                    info!("Logged in as {} ({})", username, user_id);
                    self.dispatch(LocalAction::LoggedIn { user_id, username })
                        .await;
                }
                None => {
                    warn!("Login succeeded without a user id");
                    self.notice(Notice::error("Login failed"));
                }
            },
            Ok(response) => self.notice(Notice::error(
                response.error.unwrap_or_else(|| "Login failed".to_string()),
            )),
            Err(e) => {
                warn!("Login request failed: {}", e);
                self.notice(Notice::error(format!("Network error during login: {}", e)));
            }
        }
    }

    pub async fn logout(&mut self) {
        match self.api.logout().await {
            Ok(()) => self.dispatch(LocalAction::LoggedOut).await,
            Err(e) => {
                warn!("Logout request failed: {}", e);
                self.notice(Notice::error("Error during logout"));
            }
        }
    }

    pub async fn play(&mut self) {
        if !self.state.is_logged_in() {
            return self.notice(Notice::error("Please login first"));
        }
        if self.state.is_queued() {
            debug!("Play ignored while already queued");
            return self.notice(Notice::info("Already searching for an opponent").transient());
        }

        let action = match self.api.join_queue().await {
            Ok(response) if response.queued => LocalAction::QueueJoined,
            Ok(response) => LocalAction::QueueRejected {
                error: response
                    .error
                    .unwrap_or_else(|| "Failed to join queue".to_string()),
            },
            Err(e) => {
                warn!("Queue request failed: {}", e);
                LocalAction::QueueRejected {
                    error: "Network error joining queue".to_string(),
                }
            }
        };
        self.dispatch(action).await;
    }

    pub async fn submit_guess(&mut self, input: &str) {
        self.dispatch(LocalAction::SubmitGuess {
            input: input.to_string(),
        })
        .await;
    }

    /// Server totals plus the local record. Missing server stats show as zeros.
    pub async fn show_stats(&mut self) {
        let server = match self.api.fetch_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Failed to load server stats: {}", e);
                None
            }
        };
        let local = self.load_local_stats().await;

        self.render(UiEffect::DetailedStats(DetailedStats::combine(
            server.as_ref(),
            &local,
        )));
    }

    pub async fn reset_stats(&mut self) {
        match self.stats.clear().await {
            Ok(()) => {
                info!("Local stats reset");
                self.render(UiEffect::LocalStats(LocalStatsRecord::default()));
                self.notice(Notice::info("Local stats reset").transient());
            }
            Err(e) => {
                error!("Failed to reset local stats: {:#}", e);
                self.notice(Notice::error("Could not reset local stats"));
            }
        }
    }

    pub async fn handle_inbound(&mut self, inbound: Inbound) {
        let current = self.connection.as_ref().map(|c| c.id());
        if current != Some(inbound.connection) {
            debug!("Ignoring event from stale connection {}", inbound.connection);
            return;
        }

        match inbound.event {
            InboundEvent::Server(event) => {
                debug!("Handling {}", event.name());
                let transition = reduce(std::mem::take(&mut self.state), event);
                self.apply(transition).await;
            }
            InboundEvent::Closed => {
                self.connection = None;
                self.dispatch(LocalAction::ConnectionLost).await;
            }
        }
    }

    /// Clears the transient notice once its display time is over.
    pub fn dismiss_expired_notice(&mut self, now: Instant) {
        if self.notice_deadline.is_some_and(|deadline| deadline <= now) {
            self.notice_deadline = None;
            self.renderer.clear_notice();
        }
    }

    pub async fn shutdown(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
        }
    }

    async fn dispatch(&mut self, action: LocalAction) {
        let transition = apply_action(std::mem::take(&mut self.state), action);
        self.apply(transition).await;
    }

    async fn apply(&mut self, transition: Transition) {
        self.state = transition.state;
        for effect in transition.effects {
            self.run_effect(effect).await;
        }
    }

    async fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Ui(ui) => self.render(ui),
            Effect::Connect => self.connect().await,
            Effect::Disconnect => self.shutdown().await,
            Effect::Send(event) => self.send(event),
            Effect::RecordResult { outcome, label } => self.record_result(outcome, &label).await,
            Effect::RefreshServerStats => match self.api.fetch_stats().await {
                Ok(stats) => self.render(UiEffect::ServerStats(stats)),
                Err(e) => warn!("Failed to refresh server stats: {}", e),
            },
        }
    }

    async fn connect(&mut self) {
        // At most one live connection.
        self.shutdown().await;

        match self.connector.connect(self.api.session_cookie()).await {
            Ok(transport) => {
                let handle = ConnectionHandle::spawn(transport, self.inbound_tx.clone());
                self.connection = Some(handle);
            }
            Err(e) => {
                warn!("Failed to open game connection: {}", e);
                self.notice(Notice::error(format!(
                    "Could not connect to game server: {}",
                    e
                )));
            }
        }
    }

    fn send(&mut self, event: ClientEvent) {
        let sent = match &self.connection {
            Some(connection) => connection.send(event.clone()),
            None => Err(crate::transport::TransportError::Closed),
        };

        if let Err(e) = sent {
            warn!("Could not send {}: {}", event.name(), e);
            self.notice(Notice::error("Not connected to game server"));
        }
    }

    /// Stats failures must never disturb the end-of-match flow, so they are
    /// only logged.
    async fn record_result(&mut self, outcome: MatchOutcome, label: &str) {
        match self.stats.record_result(outcome, label, Utc::now()).await {
            Ok(record) => self.render(UiEffect::LocalStats(record)),
            Err(e) => error!("Failed to update local stats: {:#}", e),
        }
    }

    async fn load_local_stats(&self) -> LocalStatsRecord {
        self.stats.load().await.unwrap_or_else(|e| {
            error!("Failed to load local stats: {:#}", e);
            LocalStatsRecord::default()
        })
    }

    fn notice(&mut self, notice: Notice) {
        self.render(UiEffect::Notice(notice));
    }

    fn render(&mut self, effect: UiEffect) {
        if let UiEffect::Notice(notice) = &effect {
            self.notice_deadline = notice
                .transient
                .then(|| Instant::now() + self.notice_dismiss);
        }
        self.renderer.render(&effect);
    }
}
