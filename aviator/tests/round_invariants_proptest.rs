/// Property-based tests for the round lifecycle and action gating using proptest
///
/// These tests feed arbitrary interleavings of push events, player actions
/// and request completions through the round machine and the gateway and
/// check the invariants that must hold after every step.
use aviator::{
    RequestFailure,
    entities::PlayerId,
    gateway::{ActionGateway, Completion, OutboundRequest, PlayerState},
    net::messages::{BetResponse, CashoutResponse},
    round::{RoundEvent, RoundOutcome, RoundPhase, RoundStateMachine},
};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Step {
    Push(RoundEvent),
    PlaceBet(f64),
    CashOut,
    /// Answer the oldest outstanding request
    Answer { success: bool },
}

// Strategy to generate a validated push event
fn event_strategy() -> impl Strategy<Value = RoundEvent> {
    prop_oneof![
        (0u32..=10).prop_map(|countdown| RoundEvent::BettingStart { countdown }),
        (0u32..=10).prop_map(|countdown| RoundEvent::CountdownTick { countdown }),
        (1.0f64..50.0).prop_map(|value| RoundEvent::MultiplierUpdate { value }),
        (1.0f64..50.0).prop_map(|crash_point| RoundEvent::Crash { crash_point }),
        (prop::bool::ANY, 0.0f64..500.0, 0.0f64..5000.0).prop_map(
            |(local, winnings, new_balance)| RoundEvent::PlayerCashedOut {
                player_id: PlayerId::new(if local { "User1" } else { "User2" }),
                winnings,
                new_balance,
            }
        ),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => event_strategy().prop_map(Step::Push),
        2 => (-10.0f64..300.0).prop_map(Step::PlaceBet),
        2 => Just(Step::CashOut),
        2 => prop::bool::ANY.prop_map(|success| Step::Answer { success }),
    ]
}

fn answer(request: OutboundRequest, success: bool) -> Completion {
    let failure = RequestFailure::Rejected { message: None };
    match request {
        OutboundRequest::Bet { ticket, request } => Completion::Bet {
            ticket,
            result: if success {
                Ok(BetResponse {
                    new_balance: 1000.0 - request.amount,
                })
            } else {
                Err(failure)
            },
        },
        OutboundRequest::CashOut { ticket, .. } => Completion::CashOut {
            ticket,
            result: if success {
                Ok(CashoutResponse {
                    winnings: 150.0,
                    new_balance: 1050.0,
                })
            } else {
                Err(failure)
            },
        },
    }
}

proptest! {
    #[test]
    fn test_crash_point_present_only_when_crashed(
        events in prop::collection::vec(event_strategy(), 0..60)
    ) {
        let mut machine = RoundStateMachine::new(PlayerId::new("User1"));

        for event in events {
            machine.apply(event);
            let state = machine.state();
            let crashed = matches!(state.phase, RoundPhase::Crashed { .. });
            prop_assert_eq!(state.crash_point().is_some(), crashed);
            prop_assert_eq!(state.countdown().is_some(), state.betting_open());
            prop_assert!(state.multiplier() >= 1.0);
        }
    }

    #[test]
    fn test_round_ids_and_multiplier_never_go_backwards(
        events in prop::collection::vec(event_strategy(), 0..60)
    ) {
        let mut machine = RoundStateMachine::new(PlayerId::new("User1"));
        let mut last = *machine.state();

        for event in events {
            let outcome = machine.apply(event);
            let state = *machine.state();

            prop_assert!(state.round >= last.round);
            if let (
                RoundPhase::Flying { multiplier: before },
                RoundPhase::Flying { multiplier: after },
            ) = (last.phase, state.phase)
                && state.round == last.round
            {
                prop_assert!(after >= before, "multiplier dropped from {} to {}", before, after);
            }
            if matches!(outcome, RoundOutcome::Ignored { .. }) {
                prop_assert_eq!(state, last);
            }
            last = state;
        }
    }

    #[test]
    fn test_gateway_never_issues_invalid_requests(
        steps in prop::collection::vec(step_strategy(), 0..80)
    ) {
        let player = PlayerId::new("User1");
        let mut machine = RoundStateMachine::new(player.clone());
        let mut gateway = ActionGateway::new(player, PlayerState::default());
        let mut outstanding: Vec<OutboundRequest> = Vec::new();

        for step in steps {
            match step {
                Step::Push(event) => {
                    let outcome = machine.apply(event);
                    gateway.observe(&outcome);
                }
                Step::PlaceBet(amount) => {
                    let was_pending = gateway.bet_pending();
                    if let Ok(request) = gateway.place_bet(machine.state(), amount) {
                        prop_assert!(machine.state().betting_open());
                        prop_assert!(!was_pending);
                        prop_assert!(amount > 0.0);
                        prop_assert_eq!(request.ticket().round, machine.state().round);
                        outstanding.push(request);
                    }
                }
                Step::CashOut => {
                    let was_pending = gateway.cashout_pending();
                    let had_bet = gateway.player().bet_placed;
                    if let Ok(request) = gateway.cash_out(machine.state()) {
                        prop_assert!(had_bet);
                        prop_assert!(!was_pending);
                        outstanding.push(request);
                    }
                }
                Step::Answer { success } => {
                    if !outstanding.is_empty() {
                        let request = outstanding.remove(0);
                        gateway.complete(machine.state(), answer(request, success));
                    }
                }
            }

            let pending_bets = outstanding
                .iter()
                .filter(|r| matches!(r, OutboundRequest::Bet { .. }))
                .count();
            let pending_cashouts = outstanding.len() - pending_bets;
            prop_assert!(pending_bets <= 1);
            prop_assert!(pending_cashouts <= 1);
            prop_assert_eq!(gateway.bet_pending(), pending_bets == 1);
            prop_assert_eq!(gateway.cashout_pending(), pending_cashouts == 1);

            let state = gateway.player();
            prop_assert!(state.balance >= 0.0);
            prop_assert!(state.bet_amount > 0.0);
            if state.payout().is_none() {
                prop_assert_eq!(state.winnings, 0.0);
            }
        }
    }
}
