//! Terminal rendering of session updates.

use aviator::{
    gateway::Reconciliation,
    round::RoundOutcome,
    session::{ActionKind, SessionSnapshot, SessionUpdate, UpdateCause},
};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Ack,
    Alert,
    Error,
    Game,
    You,
}

impl RecordKind {
    fn label(self) -> &'static str {
        match self {
            Self::Ack => "ACK",
            Self::Alert => "ALERT",
            Self::Error => "ERROR",
            Self::Game => "GAME",
            Self::You => "YOU",
        }
    }
}

/// A timestamped terminal message with an importance label to help
/// direct user attention.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub datetime: DateTime<Utc>,
    pub kind: RecordKind,
    pub content: String,
}

impl Record {
    pub fn new(kind: RecordKind, content: String) -> Self {
        Self {
            datetime: Utc::now(),
            kind,
            content,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {:5}]: {}",
            self.datetime.format("%H:%M:%S"),
            self.kind.label(),
            self.content
        )
    }
}

/// Turn an update into a line for the player, if it deserves one.
pub fn describe(update: &SessionUpdate) -> Option<Record> {
    let player = &update.snapshot.player;

    let (kind, content) = match &update.cause {
        UpdateCause::Subscribed => return None,
        UpdateCause::Round(outcome) => describe_round(outcome)?,
        UpdateCause::Requested(ActionKind::Bet) => (
            RecordKind::Ack,
            format!("Bet of {:.2} sent", player.bet_amount),
        ),
        UpdateCause::Requested(ActionKind::CashOut) => {
            (RecordKind::Ack, "Cashout sent".to_string())
        }
        UpdateCause::Rejected(_, rejection) => (RecordKind::Error, rejection.to_string()),
        UpdateCause::Reconciled(kind, reconciliation) => match (kind, reconciliation) {
            (ActionKind::Bet, Reconciliation::Applied) => (
                RecordKind::You,
                format!("Bet placed! Balance: {:.2}", player.balance),
            ),
            (ActionKind::CashOut, Reconciliation::Applied) => (
                RecordKind::You,
                format!("You won {:.2}!", player.winnings),
            ),
            (_, Reconciliation::Failed { message }) => (RecordKind::Error, message.clone()),
            (_, Reconciliation::StaleRound { .. } | Reconciliation::UnknownTicket) => {
                return None;
            }
        },
        UpdateCause::BetAmountChanged => (
            RecordKind::Ack,
            format!("Bet amount set to {:.2}", player.bet_amount),
        ),
    };

    Some(Record::new(kind, content))
}

fn describe_round(outcome: &RoundOutcome) -> Option<(RecordKind, String)> {
    let line = match outcome {
        RoundOutcome::RoundStarted { countdown, .. } => (
            RecordKind::Game,
            format!("Place your bets! {countdown}s remaining"),
        ),
        RoundOutcome::Joined { phase, .. } => {
            (RecordKind::Game, format!("Joined a round in progress: {phase}"))
        }
        RoundOutcome::CountdownUpdated { countdown } => {
            (RecordKind::Game, format!("{countdown}s remaining"))
        }
        RoundOutcome::BettingClosed { .. } => {
            (RecordKind::Alert, "Betting closed, flying!".to_string())
        }
        RoundOutcome::MultiplierUpdated { multiplier } => {
            (RecordKind::Game, format!("x{multiplier:.2}"))
        }
        RoundOutcome::Crashed { crash_point, .. } => {
            (RecordKind::Alert, format!("Crashed at: x{crash_point:.2}"))
        }
        RoundOutcome::LocalCashout { winnings, .. } => {
            (RecordKind::You, format!("You won {winnings:.2}!"))
        }
        RoundOutcome::RemoteCashout {
            player_id,
            winnings,
        } => (
            RecordKind::Game,
            format!("{player_id} cashed out {winnings:.2}"),
        ),
        RoundOutcome::Ignored { .. } => return None,
    };
    Some(line)
}

/// Multi-line summary printed by the `status` command.
pub fn status(snapshot: &SessionSnapshot) -> String {
    let player = &snapshot.player;

    let bet = match player.payout() {
        Some(winnings) => format!("cashed out, won {winnings:.2}"),
        None if player.bet_placed => format!("{:.2} riding", player.bet_amount),
        None if snapshot.bet_pending => "waiting for confirmation".to_string(),
        None => "none".to_string(),
    };

    let mut actions = Vec::new();
    if snapshot.can_place_bet {
        actions.push("bet");
    }
    if snapshot.can_cash_out {
        actions.push("cashout");
    }
    if actions.is_empty() {
        actions.push("none");
    }

    let mut out = format!(
        "Balance: {:.2} | Bet amount: {:.2}\nRound {}: {}\nBet: {bet}\nActions: {}",
        player.balance,
        player.bet_amount,
        snapshot.round.round,
        snapshot.round.phase,
        actions.join(", ")
    );
    if let Some(error) = &player.last_error {
        out.push_str(&format!("\nLast error: {error}"));
    }
    out
}
