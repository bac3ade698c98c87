//! Bet and cashout mediation.

use log::{debug, warn};

use super::models::{Completion, OutboundRequest, PlayerState, Reconciliation, Ticket};
use crate::{
    entities::{Amount, PlayerId, is_valid_stake},
    errors::ActionRejected,
    net::messages::{BetRequest, CashoutRequest},
    round::{RoundOutcome, RoundState},
};

const BET_FAILED: &str = "Bet failed!";
const CASHOUT_FAILED: &str = "Cashout failed!";

/// Gatekeeper for the player's two actions.
///
/// Checks preconditions against the current [`RoundState`] without any I/O,
/// hands out at most one in-flight request per action, and merges request
/// completions and round outcomes into [`PlayerState`].
#[derive(Debug)]
pub struct ActionGateway {
    player_id: PlayerId,
    player: PlayerState,
    next_ticket: u64,
    bet_in_flight: Option<Ticket>,
    cashout_in_flight: Option<Ticket>,
}

impl ActionGateway {
    #[must_use]
    pub const fn new(player_id: PlayerId, player: PlayerState) -> Self {
        Self {
            player_id,
            player,
            next_ticket: 0,
            bet_in_flight: None,
            cashout_in_flight: None,
        }
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerState {
        &self.player
    }

    #[must_use]
    pub const fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    #[must_use]
    pub const fn bet_pending(&self) -> bool {
        self.bet_in_flight.is_some()
    }

    #[must_use]
    pub const fn cashout_pending(&self) -> bool {
        self.cashout_in_flight.is_some()
    }

    /// Whether a bet of the current `bet_amount` would pass the local checks.
    #[must_use]
    pub fn can_place_bet(&self, round: &RoundState) -> bool {
        self.check_bet(round, self.player.bet_amount).is_ok()
    }

    #[must_use]
    pub fn can_cash_out(&self) -> bool {
        self.check_cash_out().is_ok()
    }

    /// Change the default stake. Only allowed while no bet is active.
    ///
    /// # Errors
    ///
    /// [`ActionRejected::BetActive`] while a bet is placed or in flight,
    /// [`ActionRejected::InvalidAmount`] for non-positive amounts.
    pub fn set_bet_amount(&mut self, amount: Amount) -> Result<(), ActionRejected> {
        let result = if self.player.bet_placed || self.bet_pending() {
            Err(ActionRejected::BetActive)
        } else if !is_valid_stake(amount) {
            Err(ActionRejected::InvalidAmount)
        } else {
            self.player.bet_amount = amount;
            Ok(())
        };
        self.record(result)
    }

    /// Clear a bet of `amount` for sending.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition; no request is issued and the
    /// reason is also stored in `last_error`.
    pub fn place_bet(
        &mut self,
        round: &RoundState,
        amount: Amount,
    ) -> Result<OutboundRequest, ActionRejected> {
        self.record(self.check_bet(round, amount))?;

        let ticket = self.issue_ticket(round);
        self.bet_in_flight = Some(ticket);
        self.player.bet_amount = amount;
        debug!("Round {}: bet {amount:.2} issued (ticket {})", ticket.round, ticket.id);

        Ok(OutboundRequest::Bet {
            ticket,
            request: BetRequest {
                player_id: self.player_id.clone(),
                amount,
            },
        })
    }

    /// Clear a cashout for sending.
    ///
    /// The phase is not checked. If the round is still flying server-side
    /// the server pays out, and its answer wins.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition; no request is issued and the
    /// reason is also stored in `last_error`.
    pub fn cash_out(&mut self, round: &RoundState) -> Result<OutboundRequest, ActionRejected> {
        self.record(self.check_cash_out())?;

        let ticket = self.issue_ticket(round);
        self.cashout_in_flight = Some(ticket);
        debug!("Round {}: cashout issued (ticket {})", ticket.round, ticket.id);

        Ok(OutboundRequest::CashOut {
            ticket,
            request: CashoutRequest {
                player_id: self.player_id.clone(),
            },
        })
    }

    /// Merge a request completion.
    ///
    /// The in-flight slot is freed whatever the outcome. Completions issued
    /// in an earlier round than `round` do not touch player state.
    pub fn complete(&mut self, round: &RoundState, completion: Completion) -> Reconciliation {
        let ticket = completion.ticket();
        let slot = match completion {
            Completion::Bet { .. } => &mut self.bet_in_flight,
            Completion::CashOut { .. } => &mut self.cashout_in_flight,
        };
        if *slot != Some(ticket) {
            warn!("Completion for unknown ticket {} ignored", ticket.id);
            return Reconciliation::UnknownTicket;
        }
        *slot = None;

        if ticket.round != round.round {
            debug!(
                "Completion for round {} ignored in round {}",
                ticket.round, round.round
            );
            return Reconciliation::StaleRound {
                issued: ticket.round,
                current: round.round,
            };
        }

        match completion {
            Completion::Bet { result: Ok(response), .. } => {
                self.player.balance = response.new_balance;
                // A confirmation that lands after the crash is for a bet
                // already lost to it.
                self.player.bet_placed = round.crash_point().is_none();
                self.player.last_error = None;
                Reconciliation::Applied
            }
            Completion::Bet {
                result: Err(failure),
                ..
            } => self.fail(failure.player_message(BET_FAILED)),
            Completion::CashOut { result: Ok(response), .. } => {
                self.player.winnings = response.winnings;
                self.player.balance = response.new_balance;
                self.player.cashed_out = true;
                self.player.bet_placed = false;
                self.player.last_error = None;
                Reconciliation::Applied
            }
            Completion::CashOut {
                result: Err(failure),
                ..
            } => self.fail(failure.player_message(CASHOUT_FAILED)),
        }
    }

    /// Apply the per-round player effects of a round machine outcome.
    pub fn observe(&mut self, outcome: &RoundOutcome) {
        match outcome {
            RoundOutcome::RoundStarted { .. } | RoundOutcome::Joined { .. } => {
                self.player.reset_round();
            }
            RoundOutcome::Crashed { .. } => {
                if !self.player.cashed_out {
                    self.player.bet_placed = false;
                }
            }
            RoundOutcome::LocalCashout {
                winnings,
                new_balance,
            } => {
                self.player.winnings = *winnings;
                self.player.balance = *new_balance;
                self.player.cashed_out = true;
                self.player.bet_placed = false;
                self.player.last_error = None;
            }
            _ => {}
        }
    }

    fn check_bet(&self, round: &RoundState, amount: Amount) -> Result<(), ActionRejected> {
        if !round.betting_open() {
            Err(ActionRejected::BettingClosed)
        } else if self.bet_pending() {
            Err(ActionRejected::BetInProgress)
        } else if self.player.bet_placed {
            Err(ActionRejected::BetAlreadyPlaced)
        } else if !is_valid_stake(amount) {
            Err(ActionRejected::InvalidAmount)
        } else {
            Ok(())
        }
    }

    fn check_cash_out(&self) -> Result<(), ActionRejected> {
        if self.cashout_pending() {
            Err(ActionRejected::CashoutInProgress)
        } else if self.player.cashed_out {
            Err(ActionRejected::AlreadyCashedOut)
        } else if !self.player.bet_placed {
            Err(ActionRejected::NoActiveBet)
        } else {
            Ok(())
        }
    }

    fn issue_ticket(&mut self, round: &RoundState) -> Ticket {
        self.next_ticket += 1;
        Ticket {
            id: self.next_ticket,
            round: round.round,
        }
    }

    fn record<T>(&mut self, result: Result<T, ActionRejected>) -> Result<T, ActionRejected> {
        if let Err(rejection) = &result {
            self.player.last_error = Some(rejection.to_string());
        }
        result
    }

    fn fail(&mut self, message: String) -> Reconciliation {
        self.player.last_error = Some(message.clone());
        Reconciliation::Failed { message }
    }
}
