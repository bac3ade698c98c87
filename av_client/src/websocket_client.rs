//! WebSocket push feed for real-time round events.

use anyhow::{Context, Result, bail};
use aviator::{
    SessionHandle,
    net::codec::{CONNECT, Frame, PONG, decode_frame},
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Delay schedule between reconnect attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Consecutive failed attempts before giving up; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (counting from 0): the base
    /// delay doubled per attempt, capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

/// Why a single connection ended.
#[derive(Debug, PartialEq)]
enum FeedEnd {
    /// The session is gone; stop for good.
    SessionClosed,
    /// The connection dropped after it was established.
    Dropped(String),
}

/// Push channel client. Forwards decoded round events to the session and
/// keeps the connection alive across drops.
pub struct PushFeed {
    url: String,
    handle: SessionHandle,
    policy: ReconnectPolicy,
}

impl PushFeed {
    /// Create a new push feed
    pub fn new(url: String, handle: SessionHandle, policy: ReconnectPolicy) -> Self {
        Self {
            url,
            handle,
            policy,
        }
    }

    /// Connect and forward events until the session closes.
    ///
    /// # Errors
    ///
    /// Fails once the reconnect policy runs out of attempts.
    pub async fn run(self) -> Result<()> {
        let mut attempt = 0;

        loop {
            match self.connect_once().await {
                Ok(FeedEnd::SessionClosed) => {
                    debug!("Session closed, push feed stopping");
                    return Ok(());
                }
                Ok(FeedEnd::Dropped(reason)) => {
                    warn!("Push connection lost: {reason}");
                    attempt = 0;
                }
                Err(e) => {
                    warn!("Push connection failed: {e:#}");
                }
            }

            if self.handle.is_closed() {
                return Ok(());
            }
            if !self.policy.allows(attempt) {
                bail!("Gave up on {} after {attempt} attempts", self.url);
            }

            let delay = self.policy.delay(attempt);
            attempt += 1;
            info!("Reconnecting in {}ms (attempt {attempt})", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    async fn connect_once(&self) -> Result<FeedEnd> {
        let (ws_stream, _) = connect_async(self.url.as_str())
            .await
            .context("Failed to connect to WebSocket")?;
        info!("Connected to {}", self.url);

        let (mut write, mut read) = ws_stream.split();

        while let Some(msg) = read.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => {
                    return Ok(FeedEnd::Dropped("server closed connection".to_string()));
                }
                Ok(_) => continue,
                Err(e) => return Ok(FeedEnd::Dropped(e.to_string())),
            };

            match decode_frame(&text) {
                Ok(Frame::Open) => {
                    write
                        .send(Message::Text(CONNECT.to_string().into()))
                        .await
                        .context("Failed to join namespace")?;
                }
                Ok(Frame::Ping) => {
                    write
                        .send(Message::Text(PONG.to_string().into()))
                        .await
                        .context("Failed to answer ping")?;
                }
                Ok(Frame::Connected) => debug!("Namespace joined"),
                Ok(Frame::Disconnected) => {
                    return Ok(FeedEnd::Dropped("server disconnected".to_string()));
                }
                Ok(Frame::Event(message)) => {
                    if self.handle.push(message).await.is_err() {
                        let _ = write.close().await;
                        return Ok(FeedEnd::SessionClosed);
                    }
                }
                Ok(Frame::Pong) => {}
                Ok(Frame::Unrecognized(name)) => debug!("Ignoring push frame '{name}'"),
                Err(e) => warn!("Dropping malformed push frame: {e}"),
            }
        }

        Ok(FeedEnd::Dropped("stream ended".to_string()))
    }
}
