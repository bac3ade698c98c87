//! Error types for the crash client core.

use thiserror::Error;

/// A user action refused before any request left the client.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ActionRejected {
    #[error("Betting is closed!")]
    BettingClosed,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("bet already in progress")]
    BetInProgress,
    #[error("bet already placed")]
    BetAlreadyPlaced,
    #[error("can't change the bet amount while a bet is active")]
    BetActive,
    #[error("no active bet")]
    NoActiveBet,
    #[error("already cashed out")]
    AlreadyCashedOut,
    #[error("cashout already in progress")]
    CashoutInProgress,
}

/// Failure of a request that did leave the client.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RequestFailure {
    /// The server answered with an error status.
    #[error("rejected by server: {}", .message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },

    /// The request never got an answer (connection refused, reset, bad body).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timeout")]
    Timeout,
}

impl RequestFailure {
    /// Message to show the player, falling back to `fallback` when the
    /// server gave no reason or the failure happened in transport.
    #[must_use]
    pub fn player_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            Self::Timeout => "timeout".to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// An inbound push payload that failed decoding or validation.
///
/// These never reach the player: they are logged and dropped where the
/// session receives them.
#[derive(Debug, Error)]
pub enum MalformedEvent {
    #[error("failed to decode push payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("{event}: negative countdown {value}")]
    NegativeCountdown { event: &'static str, value: i64 },

    #[error("{event}: countdown {value} out of range")]
    CountdownOutOfRange { event: &'static str, value: i64 },

    #[error("{event}: multiplier {value} below 1.0")]
    MultiplierOutOfRange { event: &'static str, value: f64 },

    #[error("{event}: invalid amount {value} for {field}")]
    InvalidAmount {
        event: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("{event}: missing player id")]
    MissingPlayerId { event: &'static str },
}

/// Errors returned through a [`crate::session::SessionHandle`].
#[derive(Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] ActionRejected),

    #[error("session is closed")]
    Closed,
}
