//! Session actor implementation with async message handling.

use super::messages::{
    ActionKind, SessionMessage, SessionSnapshot, SessionUpdate, UpdateCause,
};
use crate::{
    api::BettingApi,
    config::SessionConfig,
    entities::Amount,
    errors::{ActionRejected, RequestFailure, SessionError},
    gateway::{ActionGateway, Completion, OutboundRequest, PlayerState},
    net::messages::PushMessage,
    round::{RoundEvent, RoundOutcome, RoundStateMachine},
};
use log::{debug, info, warn};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};

/// Session handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    /// Create a new session handle
    pub fn new(sender: mpsc::Sender<SessionMessage>) -> Self {
        Self { sender }
    }

    /// Whether the session loop has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Hand a push event to the session
    pub async fn push(&self, message: PushMessage) -> Result<(), SessionError> {
        self.send(SessionMessage::Push(message)).await
    }

    /// Place a bet. Resolves once the local checks passed and the request
    /// is on its way; the server's answer arrives later as an update.
    pub async fn place_bet(&self, amount: Option<Amount>) -> Result<(), SessionError> {
        self.request(|response| SessionMessage::PlaceBet { amount, response })
            .await?
            .map_err(SessionError::from)
    }

    /// Cash out the active bet. Resolves like [`SessionHandle::place_bet`].
    pub async fn cash_out(&self) -> Result<(), SessionError> {
        self.request(|response| SessionMessage::CashOut { response })
            .await?
            .map_err(SessionError::from)
    }

    /// Change the default bet amount
    pub async fn set_bet_amount(&self, amount: Amount) -> Result<(), SessionError> {
        self.request(|response| SessionMessage::SetBetAmount { amount, response })
            .await?
            .map_err(SessionError::from)
    }

    /// Get a snapshot of round and player state
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|response| SessionMessage::GetSnapshot { response })
            .await
    }

    /// Subscribe to state changes. The first update carries the current
    /// state; updates that don't fit in `capacity` are dropped.
    pub async fn subscribe(
        &self,
        capacity: usize,
    ) -> Result<mpsc::Receiver<SessionUpdate>, SessionError> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.send(SessionMessage::Subscribe { sender }).await?;
        Ok(receiver)
    }

    /// Stop the session loop
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionMessage::Shutdown).await
    }

    async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

/// Session actor owning the round state machine and the action gateway.
///
/// Push events, user intents and request completions are handled one at a
/// time by [`GameSession::run`]; nothing else touches round or player state.
pub struct GameSession {
    /// Session configuration
    config: SessionConfig,

    /// Round lifecycle
    machine: RoundStateMachine,

    /// Player state and request bookkeeping
    gateway: ActionGateway,

    /// Request channel to the server
    api: Arc<dyn BettingApi>,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Completions of spawned requests
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_sender: mpsc::UnboundedSender<Completion>,

    /// Subscribers for state change notifications
    subscribers: Vec<mpsc::Sender<SessionUpdate>>,
}

impl GameSession {
    /// Create a new session actor
    ///
    /// # Arguments
    ///
    /// * `config` - Session configuration
    /// * `api` - Request channel used for bets and cashouts
    ///
    /// # Returns
    ///
    /// * `(GameSession, SessionHandle)` - Actor and handle for sending messages
    pub fn new(config: SessionConfig, api: Arc<dyn BettingApi>) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        let (completion_sender, completions) = mpsc::unbounded_channel();

        let machine = RoundStateMachine::new(config.player_id.clone());
        let gateway = ActionGateway::new(
            config.player_id.clone(),
            PlayerState::new(config.initial_balance, config.bet_amount),
        );

        let session = Self {
            config,
            machine,
            gateway,
            api,
            inbox,
            completions,
            completion_sender,
            subscribers: Vec::new(),
        };

        (session, SessionHandle::new(sender))
    }

    /// Run the session event loop
    pub async fn run(mut self) {
        info!("Session for {} starting", self.config.player_id);

        loop {
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(SessionMessage::Shutdown) | None => break,
                    Some(message) => self.handle_message(message),
                },

                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion);
                }
            }
        }

        info!("Session for {} closed", self.config.player_id);
    }

    /// Handle a session message
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Push(push) => self.handle_push(push),

            SessionMessage::PlaceBet { amount, response } => {
                let result = self.handle_place_bet(amount);
                let _ = response.send(result);
            }

            SessionMessage::CashOut { response } => {
                let result = self.handle_cash_out();
                let _ = response.send(result);
            }

            SessionMessage::SetBetAmount { amount, response } => {
                let result = self.gateway.set_bet_amount(amount);
                match result {
                    Ok(()) => self.publish(UpdateCause::BetAmountChanged),
                    Err(rejection) => {
                        self.publish(UpdateCause::Rejected(ActionKind::Bet, rejection));
                    }
                }
                let _ = response.send(result);
            }

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.snapshot());
            }

            SessionMessage::Subscribe { sender } => {
                let update = SessionUpdate {
                    snapshot: self.snapshot(),
                    cause: UpdateCause::Subscribed,
                };
                if sender.try_send(update).is_ok() {
                    self.subscribers.push(sender);
                }
            }

            SessionMessage::Shutdown => {}
        }
    }

    fn handle_push(&mut self, push: PushMessage) {
        let event = match RoundEvent::try_from(push) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping malformed push event: {e}");
                return;
            }
        };

        let outcome = self.machine.apply(event);
        if matches!(outcome, RoundOutcome::Ignored { .. }) {
            return;
        }
        self.gateway.observe(&outcome);
        self.publish(UpdateCause::Round(outcome));
    }

    fn handle_place_bet(&mut self, amount: Option<Amount>) -> Result<(), ActionRejected> {
        let amount = amount.unwrap_or(self.gateway.player().bet_amount);
        let result = self.gateway.place_bet(self.machine.state(), amount);
        self.issue(ActionKind::Bet, result)
    }

    fn handle_cash_out(&mut self) -> Result<(), ActionRejected> {
        let result = self.gateway.cash_out(self.machine.state());
        self.issue(ActionKind::CashOut, result)
    }

    fn issue(
        &mut self,
        kind: ActionKind,
        result: Result<OutboundRequest, ActionRejected>,
    ) -> Result<(), ActionRejected> {
        match result {
            Ok(request) => {
                self.dispatch(request);
                self.publish(UpdateCause::Requested(kind));
                Ok(())
            }
            Err(rejection) => {
                debug!("{kind:?} rejected locally: {rejection}");
                self.publish(UpdateCause::Rejected(kind, rejection));
                Err(rejection)
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        let kind = match completion {
            Completion::Bet { .. } => ActionKind::Bet,
            Completion::CashOut { .. } => ActionKind::CashOut,
        };
        let reconciliation = self.gateway.complete(self.machine.state(), completion);
        debug!("{kind:?} completed: {reconciliation:?}");
        self.publish(UpdateCause::Reconciled(kind, reconciliation));
    }

    /// Send `request` on a separate task; its completion comes back through
    /// the completion channel.
    fn dispatch(&self, request: OutboundRequest) {
        let api = Arc::clone(&self.api);
        let completions = self.completion_sender.clone();
        let limit = self.config.request_timeout;

        tokio::spawn(async move {
            let completion = match request {
                OutboundRequest::Bet { ticket, request } => Completion::Bet {
                    ticket,
                    result: with_timeout(limit, api.place_bet(request)).await,
                },
                OutboundRequest::CashOut { ticket, request } => Completion::CashOut {
                    ticket,
                    result: with_timeout(limit, api.cash_out(request)).await,
                },
            };
            // Session gone; nobody left to reconcile with.
            let _ = completions.send(completion);
        });
    }

    fn snapshot(&self) -> SessionSnapshot {
        let round = *self.machine.state();
        SessionSnapshot {
            round,
            player: self.gateway.player().clone(),
            can_place_bet: self.gateway.can_place_bet(&round),
            can_cash_out: self.gateway.can_cash_out(),
            bet_pending: self.gateway.bet_pending(),
            cashout_pending: self.gateway.cashout_pending(),
        }
    }

    /// Notify subscribers, pruning closed ones. Lagging subscribers miss
    /// the update rather than stall the loop.
    fn publish(&mut self, cause: UpdateCause) {
        if self.subscribers.is_empty() {
            return;
        }

        let update = SessionUpdate {
            snapshot: self.snapshot(),
            cause,
        };
        self.subscribers
            .retain(|subscriber| match subscriber.try_send(update.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!("Subscriber lagging, update dropped");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            });
    }
}

async fn with_timeout<T>(
    limit: Duration,
    request: impl Future<Output = Result<T, RequestFailure>>,
) -> Result<T, RequestFailure> {
    tokio::time::timeout(limit, request)
        .await
        .unwrap_or_else(|_| Err(RequestFailure::Timeout))
}
