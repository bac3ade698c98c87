//! Push channel frame decoding.
//!
//! The game server speaks Socket.IO over Engine.IO v4, where an event
//! arrives as the text packet `42["gameCrash",{"crashPoint":2.3}]`. Plain
//! JSON envelopes (`{"event": .., "data": ..}`) are accepted as well so the
//! client can sit behind a simpler relay.

use serde_json::{Value, json};

use super::messages::PushMessage;
use crate::errors::MalformedEvent;

/// Engine.IO pong, the answer to a server ping.
pub const PONG: &str = "3";

/// Socket.IO connect request for the default namespace.
pub const CONNECT: &str = "40";

/// A decoded push frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Engine.IO handshake. The client answers with [`CONNECT`].
    Open,
    /// Engine.IO heartbeat. The client answers with [`PONG`].
    Ping,
    Pong,
    /// Socket.IO namespace joined.
    Connected,
    /// Server-side close of the namespace or the transport.
    Disconnected,
    Event(PushMessage),
    /// Well-formed frame the client has no use for.
    Unrecognized(String),
}

/// Decode one text frame from the push channel.
///
/// # Errors
///
/// Returns [`MalformedEvent`] when the frame is not valid Engine.IO,
/// Socket.IO or JSON, or when a known event carries a bad payload.
pub fn decode_frame(text: &str) -> Result<Frame, MalformedEvent> {
    let text = text.trim();
    if text.starts_with('{') {
        return decode_envelope(text);
    }

    let mut chars = text.chars();
    match chars.next() {
        Some('0') => Ok(Frame::Open),
        Some('1') => Ok(Frame::Disconnected),
        Some('2') => Ok(Frame::Ping),
        Some('3') => Ok(Frame::Pong),
        Some('4') => decode_socketio(chars.as_str()),
        Some('6') => Ok(Frame::Unrecognized("noop".to_string())),
        _ => Err(MalformedEvent::InvalidFrame(preview(text))),
    }
}

fn decode_envelope(text: &str) -> Result<Frame, MalformedEvent> {
    let value: Value = serde_json::from_str(text)?;
    let name = value
        .get("event")
        .and_then(Value::as_str)
        .ok_or_else(|| MalformedEvent::InvalidFrame("envelope without event name".to_string()))?;
    if !PushMessage::is_known_event(name) {
        return Ok(Frame::Unrecognized(name.to_string()));
    }
    Ok(Frame::Event(serde_json::from_value(value)?))
}

fn decode_socketio(packet: &str) -> Result<Frame, MalformedEvent> {
    let mut chars = packet.chars();
    match chars.next() {
        Some('0') => Ok(Frame::Connected),
        Some('1') => Ok(Frame::Disconnected),
        Some('2') => decode_event(chars.as_str()),
        Some('4') => Err(MalformedEvent::InvalidFrame(format!(
            "connect error: {}",
            preview(chars.as_str())
        ))),
        Some(kind) => Ok(Frame::Unrecognized(format!("socket.io packet {kind}"))),
        None => Err(MalformedEvent::InvalidFrame("empty socket.io packet".to_string())),
    }
}

fn decode_event(body: &str) -> Result<Frame, MalformedEvent> {
    // Optional "/namespace," prefix, then an optional numeric ack id.
    let body = match body.strip_prefix('/') {
        Some(rest) => rest.split_once(',').map_or("", |(_, payload)| payload),
        None => body,
    };
    let body = body.trim_start_matches(|c: char| c.is_ascii_digit());

    let value: Value = serde_json::from_str(body)?;
    let mut items = match value {
        Value::Array(items) => items.into_iter(),
        _ => {
            return Err(MalformedEvent::InvalidFrame(
                "event payload is not an array".to_string(),
            ));
        }
    };
    let name = match items.next() {
        Some(Value::String(name)) => name,
        _ => {
            return Err(MalformedEvent::InvalidFrame(
                "event without name".to_string(),
            ));
        }
    };
    if !PushMessage::is_known_event(&name) {
        return Ok(Frame::Unrecognized(name));
    }
    let data = items.next().unwrap_or(Value::Null);
    let message = serde_json::from_value(json!({ "event": name, "data": data }))?;
    Ok(Frame::Event(message))
}

fn preview(text: &str) -> String {
    text.chars().take(64).collect()
}
