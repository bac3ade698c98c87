//! HTTP request channel to the crash game server.

use async_trait::async_trait;
use aviator::{
    BettingApi, RequestFailure,
    net::messages::{BetRequest, BetResponse, CashoutRequest, CashoutResponse, ErrorResponse},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// [`BettingApi`] over plain HTTP.
///
/// `POST {server}/bet` and `POST {server}/cashout` with JSON bodies. Any
/// non-success status is a rejection; its `{ "message": .. }` body, when
/// present, becomes the reason shown to the player.
#[derive(Clone, Debug)]
pub struct HttpBettingApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBettingApi {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create an API client on top of an existing `reqwest` client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, RequestFailure>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{path}", self.base_url);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RequestFailure::Transport(format!("Failed to send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .map(|error| error.message);
            debug!("POST {url} rejected with {status}: {message:?}");
            return Err(RequestFailure::Rejected { message });
        }

        response
            .json()
            .await
            .map_err(|e| RequestFailure::Transport(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl BettingApi for HttpBettingApi {
    async fn place_bet(&self, request: BetRequest) -> Result<BetResponse, RequestFailure> {
        self.post("bet", &request).await
    }

    async fn cash_out(&self, request: CashoutRequest) -> Result<CashoutResponse, RequestFailure> {
        self.post("cashout", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let api = HttpBettingApi::new("http://localhost:5000/");
        assert_eq!(api.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_plain_base_url_kept() {
        let api = HttpBettingApi::new("http://localhost:5000");
        assert_eq!(api.base_url(), "http://localhost:5000");
    }
}
