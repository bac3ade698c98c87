//! Internal modules for the crash game client.
//!
//! This library provides the HTTP request channel, the WebSocket push feed,
//! command parsing, configuration and terminal output used by the
//! av_client binary.

pub mod api_client;
pub mod commands;
pub mod config;
pub mod display;
pub mod logging;
pub mod websocket_client;
