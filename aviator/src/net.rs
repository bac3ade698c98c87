//! Wire layer for the push and request channels.
//!
//! Only message contracts and frame decoding live here. Opening sockets and
//! sending HTTP requests is left to the embedding client.

/// Push frame decoding (Socket.IO packets and JSON envelopes).
pub mod codec;

/// Push events and request/response bodies.
pub mod messages;
