//! # Aviator
//!
//! Client-side core of a multiplayer crash betting game.
//!
//! A shared multiplier climbs from 1.0x until the server crashes the round.
//! Players bet while the betting window is open and cash out before the
//! crash to lock in `bet * multiplier`. This crate merges the server's push
//! stream with the player's bet and cashout requests into one consistent
//! view of what the player can do right now.
//!
//! ## Architecture
//!
//! - [`round`]: the round state machine, driven only by server pushes
//!   (idle → betting → flying → crashed)
//! - [`gateway`]: precondition checks for bets and cashouts, at most one
//!   request in flight per action, and reconciliation of their results
//! - [`session`]: the single-writer actor that feeds both from one queue
//! - [`net`]: push and request message contracts, push frame decoding
//! - [`api`]: the [`BettingApi`] seam the embedding client implements
//!
//! Transport (sockets, HTTP) is not part of this crate.
//!
//! ## Example
//!
//! ```
//! use aviator::{
//!     entities::PlayerId,
//!     round::{RoundEvent, RoundStateMachine},
//! };
//!
//! let mut machine = RoundStateMachine::new(PlayerId::new("User1"));
//! machine.apply(RoundEvent::BettingStart { countdown: 5 });
//! assert!(machine.state().betting_open());
//! ```

/// Request channel seam.
pub mod api;

/// Session configuration.
pub mod config;

/// Shared value types.
pub mod entities;

/// Error taxonomy.
pub mod errors;

/// Bet and cashout mediation.
pub mod gateway;

/// Wire messages and push frame decoding.
pub mod net;

/// Round lifecycle state machine.
pub mod round;

/// Single-writer session actor.
pub mod session;

pub use api::BettingApi;
pub use config::SessionConfig;
pub use errors::{ActionRejected, MalformedEvent, RequestFailure, SessionError};
pub use net::messages::PushMessage;
pub use session::{GameSession, SessionHandle};
