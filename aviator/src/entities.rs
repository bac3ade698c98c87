//! Small value types shared by the round machine, the gateway and the wire
//! messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency amount as reported by the game server.
pub type Amount = f64;

/// Multiplier every round starts from.
pub const BASE_MULTIPLIER: f64 = 1.0;

/// Balance a fresh client starts with until the server reports otherwise.
pub const DEFAULT_BALANCE: Amount = 1000.0;

/// Bet amount pre-filled for a fresh client.
pub const DEFAULT_BET_AMOUNT: Amount = 100.0;

/// Player identifier used on both the push and the request channel.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Client-side round counter.
///
/// The push protocol carries no round identifiers, so the client numbers
/// rounds itself. Every new round gets the next id.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RoundId(pub u64);

impl RoundId {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether `amount` is a usable stake: finite and strictly positive.
#[must_use]
pub fn is_valid_stake(amount: Amount) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Whether `amount` is a usable balance or payout: finite and non-negative.
#[must_use]
pub fn is_valid_balance(amount: Amount) -> bool {
    amount.is_finite() && amount >= 0.0
}
