//! Round lifecycle: validated events and the state machine they drive.

pub mod events;
pub mod state_machine;

pub use events::RoundEvent;
pub use state_machine::{IgnoreReason, RoundOutcome, RoundPhase, RoundState, RoundStateMachine};
