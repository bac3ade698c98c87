//! Action gateway: the only producer of outbound requests.
//!
//! The gateway owns [`PlayerState`] and is purely synchronous. It decides
//! whether a bet or cashout may be sent, returns the request to send, and
//! later merges the request's [`Completion`] back in. Actually sending is
//! the session's job.

pub mod manager;
pub mod models;

pub use manager::ActionGateway;
pub use models::{Completion, OutboundRequest, PlayerState, Reconciliation, Ticket};
