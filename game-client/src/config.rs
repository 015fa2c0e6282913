use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub ws_url: String,
    pub stats_database_url: String,
    pub notice_dismiss: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable numbers fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let server_url = lookup("SERVER_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();
        let ws_url = lookup("WS_URL").unwrap_or_else(|| derive_ws_url(&server_url));

        Self {
            ws_url,
            stats_database_url: lookup("STATS_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://word_battle_stats.db?mode=rwc".to_string()),
            notice_dismiss: Duration::from_millis(parse_or(&lookup, "NOTICE_DISMISS_MS", 2000)),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 10)),
            server_url,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} '{}', using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// `http://host:port` becomes `ws://host:port/ws`, `https` becomes `wss`.
fn derive_ws_url(server_url: &str) -> String {
    let rest = if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        server_url.to_string()
    };
    format!("{}/ws", rest.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.ws_url, "ws://127.0.0.1:5000/ws");
        assert_eq!(config.notice_dismiss, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_ws_url_follows_server_url() {
        let config = config_from(&[("SERVER_URL", "https://battle.example.com/")]);
        assert_eq!(config.server_url, "https://battle.example.com");
        assert_eq!(config.ws_url, "wss://battle.example.com/ws");

        let config = config_from(&[
            ("SERVER_URL", "http://localhost:8000"),
            ("WS_URL", "ws://localhost:9000/socket"),
        ]);
        assert_eq!(config.ws_url, "ws://localhost:9000/socket");
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("NOTICE_DISMISS_MS", "soon"),
            ("REQUEST_TIMEOUT_SECONDS", "3"),
        ]);
        assert_eq!(config.notice_dismiss, Duration::from_millis(2000));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }
}
