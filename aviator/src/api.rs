//! Request channel seam.

use async_trait::async_trait;

use crate::{
    errors::RequestFailure,
    net::messages::{BetRequest, BetResponse, CashoutRequest, CashoutResponse},
};

/// Request/response channel to the game server.
///
/// Implementations perform exactly one request per call and report server
/// rejections as [`RequestFailure::Rejected`]. Timeouts are applied by the
/// session, so implementations need not impose their own.
#[async_trait]
pub trait BettingApi: Send + Sync {
    /// `POST /bet`
    async fn place_bet(&self, request: BetRequest) -> Result<BetResponse, RequestFailure>;

    /// `POST /cashout`
    async fn cash_out(&self, request: CashoutRequest) -> Result<CashoutResponse, RequestFailure>;
}
