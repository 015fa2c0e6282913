//! HTTP client for the account, queue and stats endpoints.
//!
//! The server keeps the login in a cookie session. The same cookie jar is
//! read back when the persistent connection is opened.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use game_types::{
    CheckAuthResponse, Credentials, LoginResponse, QueueResponse, RegisterResponse, ServerStats,
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0}")]
    Network(#[source] reqwest::Error),
    #[error("Unexpected response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("Server returned status {0}")]
    Status(u16),
}

#[async_trait]
pub trait GameApi: Send + Sync {
    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError>;
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn join_queue(&self) -> Result<QueueResponse, ApiError>;
    async fn fetch_stats(&self) -> Result<ServerStats, ApiError>;
    async fn check_auth(&self) -> Result<CheckAuthResponse, ApiError>;

    /// `Cookie` header value for opening the persistent connection, if the
    /// server has set a session.
    fn session_cookie(&self) -> Option<String>;
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(server_url).map_err(|e| ApiError::InvalidUrl {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url,
            jar,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{}", self.base_url, path),
            reason: e.to_string(),
        })
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Credentials>,
    ) -> Result<T, ApiError> {
        let mut request = self.client.post(self.endpoint(path)?);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ApiError::Network)?;
        debug!("POST {} -> {}", path, response.status());
        decode(response).await
    }

    async fn get(&self, path: &str) -> Result<Response, ApiError> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(ApiError::Network)?;
        debug!("GET {} -> {}", path, response.status());
        Ok(response)
    }
}

/// Account endpoints answer with a JSON body on failure statuses too, so the
/// body is decoded regardless of the status code.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(ApiError::Decode)
}

#[async_trait]
impl GameApi for ApiClient {
    async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ApiError> {
        self.post_json("/register", Some(credentials)).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post_json("/login", Some(credentials)).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self.get("/logout").await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn join_queue(&self) -> Result<QueueResponse, ApiError> {
        self.post_json("/queue", None).await
    }

    async fn fetch_stats(&self) -> Result<ServerStats, ApiError> {
        let response = self.get("/stats").await?;
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        decode(response).await
    }

    async fn check_auth(&self) -> Result<CheckAuthResponse, ApiError> {
        let response = self.get("/check-auth").await?;
        decode(response).await
    }

    fn session_cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        header.to_str().ok().map(str::to_string)
    }
}
