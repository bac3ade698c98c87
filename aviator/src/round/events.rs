//! Validated round events.

use crate::{
    entities::{Amount, BASE_MULTIPLIER, PlayerId, is_valid_balance},
    errors::MalformedEvent,
    net::messages::PushMessage,
};

/// A push event that passed validation and can drive the round machine.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundEvent {
    BettingStart {
        countdown: u32,
    },
    CountdownTick {
        countdown: u32,
    },
    MultiplierUpdate {
        value: f64,
    },
    Crash {
        crash_point: f64,
    },
    PlayerCashedOut {
        player_id: PlayerId,
        winnings: Amount,
        new_balance: Amount,
    },
}

impl TryFrom<PushMessage> for RoundEvent {
    type Error = MalformedEvent;

    fn try_from(message: PushMessage) -> Result<Self, Self::Error> {
        let event = message.event_name();
        match message {
            PushMessage::BettingStart { countdown } => Ok(Self::BettingStart {
                countdown: countdown_from_wire(event, countdown)?,
            }),
            PushMessage::BettingCountdown { countdown } => Ok(Self::CountdownTick {
                countdown: countdown_from_wire(event, countdown)?,
            }),
            PushMessage::MultiplierUpdate { multiplier } => Ok(Self::MultiplierUpdate {
                value: multiplier_from_wire(event, multiplier)?,
            }),
            PushMessage::GameCrash { crash_point } => Ok(Self::Crash {
                crash_point: multiplier_from_wire(event, crash_point)?,
            }),
            PushMessage::PlayerCashout {
                player_id,
                winnings,
                new_balance,
            } => {
                if player_id.is_empty() {
                    return Err(MalformedEvent::MissingPlayerId { event });
                }
                Ok(Self::PlayerCashedOut {
                    player_id,
                    winnings: amount_from_wire(event, "winnings", winnings)?,
                    new_balance: amount_from_wire(event, "newBalance", new_balance)?,
                })
            }
        }
    }
}

fn countdown_from_wire(event: &'static str, value: i64) -> Result<u32, MalformedEvent> {
    if value < 0 {
        return Err(MalformedEvent::NegativeCountdown { event, value });
    }
    u32::try_from(value).map_err(|_| MalformedEvent::CountdownOutOfRange { event, value })
}

fn multiplier_from_wire(event: &'static str, value: f64) -> Result<f64, MalformedEvent> {
    if value.is_finite() && value >= BASE_MULTIPLIER {
        Ok(value)
    } else {
        Err(MalformedEvent::MultiplierOutOfRange { event, value })
    }
}

fn amount_from_wire(
    event: &'static str,
    field: &'static str,
    value: Amount,
) -> Result<Amount, MalformedEvent> {
    if is_valid_balance(value) {
        Ok(value)
    } else {
        Err(MalformedEvent::InvalidAmount {
            event,
            field,
            value,
        })
    }
}
