//! Port interfaces for the authorization flow
//!
//! These traits define the boundaries between the flow controller and the
//! infrastructure that talks to the exchange endpoints and the browser.

use async_trait::async_trait;
use soundcheck_common::auth::{TokenExchangeRequest, TokenSet};
use soundcheck_domain::Result;

/// One code-for-token exchange path
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Short name used in logs ("intermediary", "fallback", ...)
    fn label(&self) -> &str;

    /// Redeem the authorization code for a token
    async fn exchange(&self, request: &TokenExchangeRequest) -> Result<TokenSet>;
}

/// Hands the authorization URL to whatever drives the browser
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
}
