//! Round lifecycle state machine.
//!
//! Phases move strictly on server pushes: idle → betting → flying → crashed,
//! and back to betting when the next round opens. Nothing here reads a
//! clock: timing and the crash point come from the server alone.

use log::{debug, info};
use std::fmt;

use super::events::RoundEvent;
use crate::entities::{Amount, BASE_MULTIPLIER, PlayerId, RoundId};

/// Phase of the current round, with the data meaningful in that phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundPhase {
    /// No round observed yet.
    Idle,
    /// Bets are accepted until the countdown reaches zero.
    Betting { countdown: u32 },
    /// Multiplier is live.
    Flying { multiplier: f64 },
    /// Round is over; the multiplier is frozen at the crash point.
    Crashed { crash_point: f64 },
}

impl RoundPhase {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Betting { .. } => "betting",
            Self::Flying { .. } => "flying",
            Self::Crashed { .. } => "crashed",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "waiting for the next round"),
            Self::Betting { countdown } => write!(f, "betting ({countdown}s left)"),
            Self::Flying { multiplier } => write!(f, "flying at x{multiplier:.2}"),
            Self::Crashed { crash_point } => write!(f, "crashed at x{crash_point:.2}"),
        }
    }
}

/// Round state as tracked by the client.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundState {
    pub round: RoundId,
    pub phase: RoundPhase,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            round: RoundId::default(),
            phase: RoundPhase::Idle,
        }
    }
}

impl RoundState {
    /// Seconds left to bet. Only meaningful while betting.
    #[must_use]
    pub const fn countdown(&self) -> Option<u32> {
        match self.phase {
            RoundPhase::Betting { countdown } => Some(countdown),
            _ => None,
        }
    }

    /// Live multiplier while flying, the frozen crash value once crashed,
    /// and the base multiplier otherwise.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        match self.phase {
            RoundPhase::Flying { multiplier } => multiplier,
            RoundPhase::Crashed { crash_point } => crash_point,
            RoundPhase::Idle | RoundPhase::Betting { .. } => BASE_MULTIPLIER,
        }
    }

    #[must_use]
    pub const fn crash_point(&self) -> Option<f64> {
        match self.phase {
            RoundPhase::Crashed { crash_point } => Some(crash_point),
            _ => None,
        }
    }

    #[must_use]
    pub const fn betting_open(&self) -> bool {
        matches!(self.phase, RoundPhase::Betting { .. })
    }
}

/// Why an event left the machine untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IgnoreReason {
    /// Multiplier lower than one already seen this round.
    StaleMultiplier,
    /// Event does not apply to the current phase.
    WrongPhase(&'static str),
    /// Duplicate crash notification.
    AlreadyCrashed,
}

/// What applying an event did. The gateway derives its per-round player
/// effects from this.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundOutcome {
    /// A fresh betting window opened for `round`.
    RoundStarted { round: RoundId, countdown: u32 },
    /// First push seen by a fresh client landed mid-round.
    Joined { round: RoundId, phase: RoundPhase },
    CountdownUpdated { countdown: u32 },
    /// Countdown hit zero; the round is now flying from the base multiplier.
    BettingClosed { round: RoundId },
    MultiplierUpdated { multiplier: f64 },
    Crashed { round: RoundId, crash_point: f64 },
    LocalCashout { winnings: Amount, new_balance: Amount },
    RemoteCashout { player_id: PlayerId, winnings: Amount },
    Ignored {
        event: &'static str,
        reason: IgnoreReason,
    },
}

/// Owns the [`RoundState`] and applies validated push events to it.
#[derive(Debug)]
pub struct RoundStateMachine {
    local_player: PlayerId,
    state: RoundState,
}

impl RoundStateMachine {
    #[must_use]
    pub fn new(local_player: PlayerId) -> Self {
        Self {
            local_player,
            state: RoundState::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RoundState {
        &self.state
    }

    #[must_use]
    pub fn local_player(&self) -> &PlayerId {
        &self.local_player
    }

    /// Apply one event.
    pub fn apply(&mut self, event: RoundEvent) -> RoundOutcome {
        let outcome = match event {
            RoundEvent::BettingStart { countdown } => self.start_round(countdown),
            RoundEvent::CountdownTick { countdown } => self.tick(countdown),
            RoundEvent::MultiplierUpdate { value } => self.update_multiplier(value),
            RoundEvent::Crash { crash_point } => self.crash(crash_point),
            RoundEvent::PlayerCashedOut {
                player_id,
                winnings,
                new_balance,
            } => {
                if player_id == self.local_player {
                    RoundOutcome::LocalCashout {
                        winnings,
                        new_balance,
                    }
                } else {
                    debug!("{player_id} cashed out {winnings:.2}");
                    RoundOutcome::RemoteCashout {
                        player_id,
                        winnings,
                    }
                }
            }
        };

        if let RoundOutcome::Ignored { event, reason } = &outcome {
            debug!(
                "Round {}: ignored {event} while {} ({reason:?})",
                self.state.round,
                self.state.phase.name()
            );
        }
        outcome
    }

    fn start_round(&mut self, countdown: u32) -> RoundOutcome {
        let round = self.state.round.next();
        self.state = RoundState {
            round,
            phase: RoundPhase::Betting { countdown },
        };
        info!("Round {round}: betting open for {countdown}s");
        RoundOutcome::RoundStarted { round, countdown }
    }

    fn tick(&mut self, countdown: u32) -> RoundOutcome {
        let phase = if countdown == 0 {
            RoundPhase::Flying {
                multiplier: BASE_MULTIPLIER,
            }
        } else {
            RoundPhase::Betting { countdown }
        };

        match self.state.phase {
            RoundPhase::Betting { .. } => {
                self.state.phase = phase;
                if countdown == 0 {
                    info!("Round {}: betting closed", self.state.round);
                    RoundOutcome::BettingClosed {
                        round: self.state.round,
                    }
                } else {
                    RoundOutcome::CountdownUpdated { countdown }
                }
            }
            RoundPhase::Idle => self.join(phase),
            RoundPhase::Flying { .. } | RoundPhase::Crashed { .. } => RoundOutcome::Ignored {
                event: "bettingCountdown",
                reason: IgnoreReason::WrongPhase(self.state.phase.name()),
            },
        }
    }

    fn update_multiplier(&mut self, value: f64) -> RoundOutcome {
        match self.state.phase {
            RoundPhase::Betting { .. } => {
                info!("Round {}: flying", self.state.round);
                self.state.phase = RoundPhase::Flying { multiplier: value };
                RoundOutcome::MultiplierUpdated { multiplier: value }
            }
            RoundPhase::Flying { multiplier } if value < multiplier => RoundOutcome::Ignored {
                event: "multiplierUpdate",
                reason: IgnoreReason::StaleMultiplier,
            },
            RoundPhase::Flying { .. } => {
                self.state.phase = RoundPhase::Flying { multiplier: value };
                RoundOutcome::MultiplierUpdated { multiplier: value }
            }
            RoundPhase::Idle => self.join(RoundPhase::Flying { multiplier: value }),
            RoundPhase::Crashed { .. } => RoundOutcome::Ignored {
                event: "multiplierUpdate",
                reason: IgnoreReason::WrongPhase("crashed"),
            },
        }
    }

    fn crash(&mut self, crash_point: f64) -> RoundOutcome {
        match self.state.phase {
            RoundPhase::Flying { .. } => {
                self.state.phase = RoundPhase::Crashed { crash_point };
                info!("Round {}: crashed at x{crash_point:.2}", self.state.round);
                RoundOutcome::Crashed {
                    round: self.state.round,
                    crash_point,
                }
            }
            RoundPhase::Crashed { .. } => RoundOutcome::Ignored {
                event: "gameCrash",
                reason: IgnoreReason::AlreadyCrashed,
            },
            RoundPhase::Idle | RoundPhase::Betting { .. } => RoundOutcome::Ignored {
                event: "gameCrash",
                reason: IgnoreReason::WrongPhase(self.state.phase.name()),
            },
        }
    }

    fn join(&mut self, phase: RoundPhase) -> RoundOutcome {
        let round = self.state.round.next();
        self.state = RoundState { round, phase };
        info!("Round {round}: joined while {}", phase.name());
        RoundOutcome::Joined { round, phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> RoundStateMachine {
        RoundStateMachine::new(PlayerId::new("User1"))
    }

    fn flying(machine: &mut RoundStateMachine, multiplier: f64) {
        machine.apply(RoundEvent::BettingStart { countdown: 3 });
        machine.apply(RoundEvent::CountdownTick { countdown: 0 });
        machine.apply(RoundEvent::MultiplierUpdate { value: multiplier });
    }

    #[test]
    fn test_initial_state_is_idle() {
        let machine = machine();
        assert_eq!(machine.state().phase, RoundPhase::Idle);
        assert_eq!(machine.state().round, RoundId(0));
        assert_eq!(machine.state().multiplier(), 1.0);
        assert!(machine.state().crash_point().is_none());
    }

    #[test]
    fn test_betting_start_opens_new_round() {
        let mut machine = machine();
        let outcome = machine.apply(RoundEvent::BettingStart { countdown: 5 });
        assert_eq!(
            outcome,
            RoundOutcome::RoundStarted {
                round: RoundId(1),
                countdown: 5
            }
        );
        assert_eq!(machine.state().countdown(), Some(5));
        assert!(machine.state().betting_open());
    }

    #[test]
    fn test_countdown_ticks_then_closes() {
        let mut machine = machine();
        machine.apply(RoundEvent::BettingStart { countdown: 5 });

        let outcome = machine.apply(RoundEvent::CountdownTick { countdown: 4 });
        assert_eq!(outcome, RoundOutcome::CountdownUpdated { countdown: 4 });
        assert_eq!(machine.state().countdown(), Some(4));

        let outcome = machine.apply(RoundEvent::CountdownTick { countdown: 0 });
        assert_eq!(outcome, RoundOutcome::BettingClosed { round: RoundId(1) });
        assert!(!machine.state().betting_open());
        assert_eq!(
            machine.state().phase,
            RoundPhase::Flying { multiplier: 1.0 }
        );
    }

    #[test]
    fn test_multiplier_during_betting_starts_flight() {
        let mut machine = machine();
        machine.apply(RoundEvent::BettingStart { countdown: 2 });
        let outcome = machine.apply(RoundEvent::MultiplierUpdate { value: 1.1 });
        assert_eq!(outcome, RoundOutcome::MultiplierUpdated { multiplier: 1.1 });
        assert!(machine.state().countdown().is_none());
        assert_eq!(machine.state().multiplier(), 1.1);
    }

    #[test]
    fn test_stale_multiplier_ignored() {
        let mut machine = machine();
        flying(&mut machine, 2.0);

        let outcome = machine.apply(RoundEvent::MultiplierUpdate { value: 1.8 });
        assert_eq!(
            outcome,
            RoundOutcome::Ignored {
                event: "multiplierUpdate",
                reason: IgnoreReason::StaleMultiplier
            }
        );
        assert_eq!(machine.state().multiplier(), 2.0);

        // Equal values are harmless repeats.
        let outcome = machine.apply(RoundEvent::MultiplierUpdate { value: 2.0 });
        assert_eq!(outcome, RoundOutcome::MultiplierUpdated { multiplier: 2.0 });
    }

    #[test]
    fn test_lower_multiplier_accepted_after_new_round() {
        let mut machine = machine();
        flying(&mut machine, 5.0);
        machine.apply(RoundEvent::Crash { crash_point: 5.2 });
        flying(&mut machine, 1.2);
        assert_eq!(machine.state().multiplier(), 1.2);
        assert_eq!(machine.state().round, RoundId(2));
    }

    #[test]
    fn test_crash_freezes_multiplier() {
        let mut machine = machine();
        flying(&mut machine, 2.1);
        let outcome = machine.apply(RoundEvent::Crash { crash_point: 2.3 });
        assert_eq!(
            outcome,
            RoundOutcome::Crashed {
                round: RoundId(1),
                crash_point: 2.3
            }
        );
        assert_eq!(machine.state().crash_point(), Some(2.3));
        assert_eq!(machine.state().multiplier(), 2.3);
    }

    #[test]
    fn test_duplicate_crash_is_noop() {
        let mut machine = machine();
        flying(&mut machine, 1.5);
        machine.apply(RoundEvent::Crash { crash_point: 1.7 });
        let before = *machine.state();

        let outcome = machine.apply(RoundEvent::Crash { crash_point: 9.9 });
        assert_eq!(
            outcome,
            RoundOutcome::Ignored {
                event: "gameCrash",
                reason: IgnoreReason::AlreadyCrashed
            }
        );
        assert_eq!(*machine.state(), before);
    }

    #[test]
    fn test_late_events_after_crash_ignored() {
        let mut machine = machine();
        flying(&mut machine, 1.5);
        machine.apply(RoundEvent::Crash { crash_point: 1.6 });
        let before = *machine.state();

        assert!(matches!(
            machine.apply(RoundEvent::MultiplierUpdate { value: 1.7 }),
            RoundOutcome::Ignored { .. }
        ));
        assert!(matches!(
            machine.apply(RoundEvent::CountdownTick { countdown: 2 }),
            RoundOutcome::Ignored { .. }
        ));
        assert_eq!(*machine.state(), before);
    }

    #[test]
    fn test_crash_while_betting_ignored() {
        let mut machine = machine();
        machine.apply(RoundEvent::BettingStart { countdown: 5 });
        let outcome = machine.apply(RoundEvent::Crash { crash_point: 1.0 });
        assert_eq!(
            outcome,
            RoundOutcome::Ignored {
                event: "gameCrash",
                reason: IgnoreReason::WrongPhase("betting")
            }
        );
        assert!(machine.state().betting_open());
    }

    #[test]
    fn test_countdown_while_flying_ignored() {
        let mut machine = machine();
        flying(&mut machine, 1.3);
        assert!(matches!(
            machine.apply(RoundEvent::CountdownTick { countdown: 3 }),
            RoundOutcome::Ignored { .. }
        ));
        assert_eq!(machine.state().multiplier(), 1.3);
    }

    #[test]
    fn test_late_join_mid_flight() {
        let mut machine = machine();
        let outcome = machine.apply(RoundEvent::MultiplierUpdate { value: 3.4 });
        assert_eq!(
            outcome,
            RoundOutcome::Joined {
                round: RoundId(1),
                phase: RoundPhase::Flying { multiplier: 3.4 }
            }
        );
        machine.apply(RoundEvent::Crash { crash_point: 3.5 });
        assert_eq!(machine.state().crash_point(), Some(3.5));
    }

    #[test]
    fn test_late_join_mid_countdown() {
        let mut machine = machine();
        let outcome = machine.apply(RoundEvent::CountdownTick { countdown: 2 });
        assert_eq!(
            outcome,
            RoundOutcome::Joined {
                round: RoundId(1),
                phase: RoundPhase::Betting { countdown: 2 }
            }
        );
        assert!(machine.state().betting_open());
    }

    #[test]
    fn test_cashout_classification() {
        let mut machine = machine();
        let local = machine.apply(RoundEvent::PlayerCashedOut {
            player_id: PlayerId::new("User1"),
            winnings: 200.0,
            new_balance: 1100.0,
        });
        assert_eq!(
            local,
            RoundOutcome::LocalCashout {
                winnings: 200.0,
                new_balance: 1100.0
            }
        );

        let remote = machine.apply(RoundEvent::PlayerCashedOut {
            player_id: PlayerId::new("User2"),
            winnings: 50.0,
            new_balance: 500.0,
        });
        assert_eq!(
            remote,
            RoundOutcome::RemoteCashout {
                player_id: PlayerId::new("User2"),
                winnings: 50.0
            }
        );
        assert_eq!(machine.state().phase, RoundPhase::Idle);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            RoundPhase::Crashed { crash_point: 2.3 }.to_string(),
            "crashed at x2.30"
        );
        assert_eq!(
            RoundPhase::Betting { countdown: 4 }.to_string(),
            "betting (4s left)"
        );
    }
}
