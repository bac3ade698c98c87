//! Session configuration.

use std::time::Duration;

use crate::entities::{
    Amount, DEFAULT_BALANCE, DEFAULT_BET_AMOUNT, PlayerId, is_valid_balance, is_valid_stake,
};

/// Player id used when none is configured.
pub const DEFAULT_PLAYER_ID: &str = "User1";

/// Default time allowed for a bet or cashout request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default capacity of the session inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Configuration of a [`crate::session::GameSession`].
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Local player, as known to the server.
    pub player_id: PlayerId,

    /// Balance shown until the server reports one
    pub initial_balance: Amount,

    /// Stake pre-filled for bets without an explicit amount
    pub bet_amount: Amount,

    /// Requests still unanswered after this long fail with "timeout"
    pub request_timeout: Duration,

    /// Capacity of the session inbox (push events and user intents)
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_id: PlayerId::new(DEFAULT_PLAYER_ID),
            initial_balance: DEFAULT_BALANCE,
            bet_amount: DEFAULT_BET_AMOUNT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.player_id.is_empty() {
            return Err("Player id must not be empty".to_string());
        }

        if !is_valid_balance(self.initial_balance) {
            return Err("Initial balance must be a non-negative number".to_string());
        }

        if !is_valid_stake(self.bet_amount) {
            return Err("Bet amount must be greater than 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be at least 1".to_string());
        }

        Ok(())
    }
}
