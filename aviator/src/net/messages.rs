//! Wire messages for the push channel and the request channel.
//!
//! Field names follow the game server's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::entities::{Amount, PlayerId};

/// A server push event, exactly as it arrives on the wire.
///
/// Values are not validated here; see [`crate::round::RoundEvent`].
/// As a JSON envelope it reads `{"event": "gameCrash", "data": {"crashPoint": 2.3}}`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum PushMessage {
    BettingStart {
        countdown: i64,
    },
    BettingCountdown {
        countdown: i64,
    },
    MultiplierUpdate {
        multiplier: f64,
    },
    GameCrash {
        crash_point: f64,
    },
    PlayerCashout {
        player_id: PlayerId,
        winnings: Amount,
        new_balance: Amount,
    },
}

impl PushMessage {
    /// Event names the client understands.
    pub const EVENT_NAMES: [&'static str; 5] = [
        "bettingStart",
        "bettingCountdown",
        "multiplierUpdate",
        "gameCrash",
        "playerCashout",
    ];

    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::BettingStart { .. } => "bettingStart",
            Self::BettingCountdown { .. } => "bettingCountdown",
            Self::MultiplierUpdate { .. } => "multiplierUpdate",
            Self::GameCrash { .. } => "gameCrash",
            Self::PlayerCashout { .. } => "playerCashout",
        }
    }

    #[must_use]
    pub fn is_known_event(name: &str) -> bool {
        Self::EVENT_NAMES.contains(&name)
    }
}

/// Body of `POST /bet`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRequest {
    pub player_id: PlayerId,
    pub amount: Amount,
}

/// Successful answer to `POST /bet`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetResponse {
    pub new_balance: Amount,
}

/// Body of `POST /cashout`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashoutRequest {
    pub player_id: PlayerId,
}

/// Successful answer to `POST /cashout`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashoutResponse {
    pub winnings: Amount,
    pub new_balance: Amount,
}

/// Error body the server sends with a non-success status.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
