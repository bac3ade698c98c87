//! Session actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::{
    entities::Amount,
    errors::ActionRejected,
    gateway::{PlayerState, Reconciliation},
    net::messages::PushMessage,
    round::{RoundOutcome, RoundState},
};

/// Messages that can be sent to a [`super::GameSession`]
#[derive(Debug)]
pub enum SessionMessage {
    /// Server push event, not yet validated
    Push(PushMessage),

    /// Place a bet; `None` uses the configured bet amount
    PlaceBet {
        amount: Option<Amount>,
        response: oneshot::Sender<Result<(), ActionRejected>>,
    },

    /// Cash out the active bet
    CashOut {
        response: oneshot::Sender<Result<(), ActionRejected>>,
    },

    /// Change the default bet amount
    SetBetAmount {
        amount: Amount,
        response: oneshot::Sender<Result<(), ActionRejected>>,
    },

    /// Get the current state
    GetSnapshot {
        response: oneshot::Sender<SessionSnapshot>,
    },

    /// Subscribe to state change notifications
    Subscribe { sender: mpsc::Sender<SessionUpdate> },

    /// Stop the session loop
    Shutdown,
}

/// Which player action a notification is about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionKind {
    Bet,
    CashOut,
}

/// Consistent view of round and player state at one point of the loop.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub round: RoundState,
    pub player: PlayerState,
    pub can_place_bet: bool,
    pub can_cash_out: bool,
    pub bet_pending: bool,
    pub cashout_pending: bool,
}

/// What triggered a [`SessionUpdate`].
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateCause {
    /// Initial snapshot sent to a new subscriber
    Subscribed,
    Round(RoundOutcome),
    /// A request was sent to the server
    Requested(ActionKind),
    Rejected(ActionKind, ActionRejected),
    Reconciled(ActionKind, Reconciliation),
    BetAmountChanged,
}

/// Notification sent to subscribers after every state change.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionUpdate {
    pub snapshot: SessionSnapshot,
    pub cause: UpdateCause,
}
