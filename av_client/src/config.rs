//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use crate::websocket_client::ReconnectPolicy;
use aviator::{SessionConfig, entities::PlayerId};
use std::time::Duration;

/// Server the original deployment listens on.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

const SOCKET_IO_PATH: &str = "socket.io/?EIO=4&transport=websocket";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the HTTP request channel
    pub server_url: String,
    /// WebSocket URL of the push channel
    pub push_url: String,
    /// Session configuration
    pub session: SessionConfig,
    /// Push channel reconnect schedule
    pub reconnect: ReconnectPolicy,
}

/// Values given on the command line; these win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub push_url: Option<String>,
    pub player_id: Option<String>,
    pub bet_amount: Option<f64>,
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values taken from CLI args
    ///
    /// # Returns
    ///
    /// * `Result<ClientConfig, ConfigError>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if a value is invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration reading variables through `lookup`
    ///
    /// # Errors
    ///
    /// Returns error if a value is invalid
    pub fn from_lookup(
        overrides: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = SessionConfig::default();

        let server_url = overrides
            .server_url
            .or_else(|| lookup("CRASH_SERVER_URL"))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let push_url = match overrides.push_url.or_else(|| lookup("CRASH_PUSH_URL")) {
            Some(url) => url,
            None => derive_push_url(&server_url)?,
        };

        let player_id = overrides
            .player_id
            .or_else(|| lookup("CRASH_PLAYER_ID"))
            .map_or(defaults.player_id, |id| PlayerId::new(id.trim()));

        let bet_amount = overrides
            .bet_amount
            .unwrap_or_else(|| parse_or(&lookup, "CRASH_BET_AMOUNT", defaults.bet_amount));

        let request_timeout = overrides.request_timeout_ms.map_or_else(
            || {
                Duration::from_millis(parse_or(
                    &lookup,
                    "CRASH_REQUEST_TIMEOUT_MS",
                    defaults.request_timeout.as_millis() as u64,
                ))
            },
            Duration::from_millis,
        );

        let session = SessionConfig {
            player_id,
            initial_balance: parse_or(&lookup, "CRASH_INITIAL_BALANCE", defaults.initial_balance),
            bet_amount,
            request_timeout,
            ..defaults
        };

        let reconnect = ReconnectPolicy {
            max_attempts: lookup("CRASH_RECONNECT_MAX_ATTEMPTS").and_then(|v| v.parse().ok()),
            ..ReconnectPolicy::default()
        };

        let config = ClientConfig {
            server_url,
            push_url,
            session,
            reconnect,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !has_scheme(&self.server_url, &["http://", "https://"]) {
            return Err(ConfigError::Invalid {
                var: "CRASH_SERVER_URL".to_string(),
                reason: format!("Expected an http(s) URL, got '{}'", self.server_url),
            });
        }

        if !has_scheme(&self.push_url, &["ws://", "wss://"]) {
            return Err(ConfigError::Invalid {
                var: "CRASH_PUSH_URL".to_string(),
                reason: format!("Expected a ws(s) URL, got '{}'", self.push_url),
            });
        }

        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "session".to_string(),
                reason,
            })
    }
}

/// Socket.IO WebSocket endpoint on the same host as `server_url`.
///
/// # Errors
///
/// Returns error if `server_url` is not an http(s) URL
pub fn derive_push_url(server_url: &str) -> Result<String, ConfigError> {
    let base = server_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(ConfigError::Invalid {
            var: "CRASH_SERVER_URL".to_string(),
            reason: format!("Expected an http(s) URL, got '{server_url}'"),
        });
    };
    Ok(format!("{ws_base}/{SOCKET_IO_PATH}"))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    schemes
        .iter()
        .any(|scheme| url.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

/// Helper to parse a variable with default fallback
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], overrides: Overrides) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(overrides, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[], Overrides::default()).unwrap();
        assert_eq!(config.server_url, "http://localhost:5000");
        assert_eq!(
            config.push_url,
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(config.session, SessionConfig::default());
        assert_eq!(config.reconnect, ReconnectPolicy::default());
    }

    #[test]
    fn test_env_values() {
        let config = load(
            &[
                ("CRASH_SERVER_URL", "https://crash.example.com/"),
                ("CRASH_PLAYER_ID", "alice"),
                ("CRASH_INITIAL_BALANCE", "250.5"),
                ("CRASH_BET_AMOUNT", "25"),
                ("CRASH_REQUEST_TIMEOUT_MS", "1500"),
                ("CRASH_RECONNECT_MAX_ATTEMPTS", "3"),
            ],
            Overrides::default(),
        )
        .unwrap();

        assert_eq!(config.server_url, "https://crash.example.com/");
        assert_eq!(
            config.push_url,
            "wss://crash.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(config.session.player_id.as_str(), "alice");
        assert_eq!(config.session.initial_balance, 250.5);
        assert_eq!(config.session.bet_amount, 25.0);
        assert_eq!(config.session.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.reconnect.max_attempts, Some(3));
    }

    #[test]
    fn test_overrides_win() {
        let config = load(
            &[("CRASH_PLAYER_ID", "alice"), ("CRASH_BET_AMOUNT", "25")],
            Overrides {
                server_url: Some("http://10.0.0.2:8080".to_string()),
                push_url: Some("ws://10.0.0.3:9000/feed".to_string()),
                player_id: Some("bob".to_string()),
                bet_amount: Some(40.0),
                request_timeout_ms: Some(200),
            },
        )
        .unwrap();

        assert_eq!(config.server_url, "http://10.0.0.2:8080");
        assert_eq!(config.push_url, "ws://10.0.0.3:9000/feed");
        assert_eq!(config.session.player_id.as_str(), "bob");
        assert_eq!(config.session.bet_amount, 40.0);
        assert_eq!(config.session.request_timeout, Duration::from_millis(200));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = load(
            &[("CRASH_BET_AMOUNT", "lots"), ("CRASH_RECONNECT_MAX_ATTEMPTS", "x")],
            Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.session.bet_amount, 100.0);
        assert_eq!(config.reconnect.max_attempts, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = load(&[("CRASH_SERVER_URL", "localhost:5000")], Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("CRASH_SERVER_URL"));

        let err = load(&[("CRASH_PUSH_URL", "http://localhost:5000")], Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("CRASH_PUSH_URL"));

        let err = load(&[("CRASH_BET_AMOUNT", "-5")], Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("Bet amount"));

        let err = load(&[("CRASH_PLAYER_ID", "  ")], Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("Player id"));

        let err = load(&[("CRASH_REQUEST_TIMEOUT_MS", "0")], Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_derive_push_url() {
        assert_eq!(
            derive_push_url("http://localhost:5000").unwrap(),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert!(derive_push_url("ftp://localhost").is_err());
    }
}
