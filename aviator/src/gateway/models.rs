//! Player state and the request/completion types the gateway trades in.

use crate::{
    entities::{Amount, DEFAULT_BALANCE, DEFAULT_BET_AMOUNT, RoundId},
    errors::RequestFailure,
    net::messages::{BetRequest, BetResponse, CashoutRequest, CashoutResponse},
};

/// What the local player has at stake.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Mirrors the server's value after every successful request.
    pub balance: Amount,
    /// Stake used when a bet is placed without an explicit amount.
    pub bet_amount: Amount,
    /// A bet is riding on the current round.
    pub bet_placed: bool,
    /// The current round's bet was cashed out.
    pub cashed_out: bool,
    /// Only meaningful while `cashed_out`; see [`PlayerState::payout`].
    pub winnings: Amount,
    /// Reason the last action failed, cleared by the next success.
    pub last_error: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE, DEFAULT_BET_AMOUNT)
    }
}

impl PlayerState {
    #[must_use]
    pub const fn new(balance: Amount, bet_amount: Amount) -> Self {
        Self {
            balance,
            bet_amount,
            bet_placed: false,
            cashed_out: false,
            winnings: 0.0,
            last_error: None,
        }
    }

    /// Winnings of the current round, if it was cashed out.
    #[must_use]
    pub fn payout(&self) -> Option<Amount> {
        self.cashed_out.then_some(self.winnings)
    }

    /// Clear everything scoped to a single round.
    pub(crate) fn reset_round(&mut self) {
        self.bet_placed = false;
        self.cashed_out = false;
        self.winnings = 0.0;
    }
}

/// Identifies one outbound request and the round it was issued in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Ticket {
    pub id: u64,
    pub round: RoundId,
}

/// A request the gateway cleared for sending.
#[derive(Clone, Debug, PartialEq)]
pub enum OutboundRequest {
    Bet {
        ticket: Ticket,
        request: BetRequest,
    },
    CashOut {
        ticket: Ticket,
        request: CashoutRequest,
    },
}

impl OutboundRequest {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Bet { ticket, .. } | Self::CashOut { ticket, .. } => *ticket,
        }
    }
}

/// The eventual result of an [`OutboundRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    Bet {
        ticket: Ticket,
        result: Result<BetResponse, RequestFailure>,
    },
    CashOut {
        ticket: Ticket,
        result: Result<CashoutResponse, RequestFailure>,
    },
}

impl Completion {
    #[must_use]
    pub const fn ticket(&self) -> Ticket {
        match self {
            Self::Bet { ticket, .. } | Self::CashOut { ticket, .. } => *ticket,
        }
    }
}

/// How a completion was merged into [`PlayerState`].
#[derive(Clone, Debug, PartialEq)]
pub enum Reconciliation {
    /// Success merged into player state.
    Applied,
    /// Failure recorded in `last_error`.
    Failed { message: String },
    /// Issued in an earlier round; player state left alone.
    StaleRound { issued: RoundId, current: RoundId },
    /// No request with this ticket is in flight.
    UnknownTicket,
}
