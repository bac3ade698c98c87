//! Game session: the single serialized event loop of the client.
//!
//! This module implements:
//! - GameSession: async actor owning the round state machine and the action gateway
//! - SessionHandle: cloneable handle for the push feed and the user interface
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Push events and user intents arrive on an mpsc inbox, request
//! completions on an internal channel. Each message is handled to the end
//! before the next one is looked at, so round and player state have a single
//! writer. Bet and cashout requests run on their own tasks and never block
//! the loop.
//!
//! ## Example
//!
//! ```ignore
//! use aviator::{config::SessionConfig, session::GameSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = Arc::new(MyHttpApi::new("http://localhost:5000"));
//!     let (session, handle) = GameSession::new(SessionConfig::default(), api);
//!     tokio::spawn(session.run());
//!
//!     // Feed push events with handle.push(..), act with handle.place_bet(None)
//! }
//! ```

pub mod actor;
pub mod messages;

pub use actor::{GameSession, SessionHandle};
pub use messages::{ActionKind, SessionMessage, SessionSnapshot, SessionUpdate, UpdateCause};
