//! Form-encoded token endpoint exchanger
//!
//! Posts `grant_type=authorization_code` with the code, redirect URI, client
//! id and PKCE verifier. The same shape is accepted by the trusted
//! intermediary (primary path) and by an OAuth token endpoint proper (the
//! alternate path), so one adapter serves both.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use soundcheck_common::auth::{OAuthError, TokenExchangeRequest, TokenResponse, TokenSet};
use soundcheck_core::TokenExchanger;
use soundcheck_domain::{Result, SoundcheckError};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http::HttpClient;

/// Intermediary failure body (`{"error": ..., "details": ...}`)
#[derive(Debug, serde::Deserialize)]
struct IntermediaryError {
    error: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

/// `TokenExchanger` backed by an HTTP endpoint
pub struct TokenEndpointExchanger {
    label: String,
    endpoint: Url,
    http: HttpClient,
}

impl TokenEndpointExchanger {
    /// Create an exchanger posting to `endpoint`
    ///
    /// `label` only shows up in logs ("intermediary", "fallback").
    ///
    /// # Errors
    ///
    /// Returns `SoundcheckError::Config` if `endpoint` is not an absolute
    /// URL.
    pub fn new(label: impl Into<String>, endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            SoundcheckError::Config(format!("Invalid exchange endpoint '{endpoint}': {e}"))
        })?;
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { label: label.into(), endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn describe_failure(status: u16, body: &str) -> String {
    if let Ok(IntermediaryError { error, details: Some(details) }) =
        serde_json::from_str::<IntermediaryError>(body)
    {
        return format!("HTTP {status}: {error} ({details})");
    }
    if let Ok(oauth) = serde_json::from_str::<OAuthError>(body) {
        return format!("HTTP {status}: {oauth}");
    }
    format!("HTTP {status}")
}

#[async_trait]
impl TokenExchanger for TokenEndpointExchanger {
    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self, request), fields(path = %self.label))]
    async fn exchange(&self, request: &TokenExchangeRequest) -> Result<TokenSet> {
        let builder = self
            .http
            .request(Method::POST, self.endpoint.clone())
            .form(&request.form_fields());

        let response = self.http.send(builder).await.map_err(|err| {
            SoundcheckError::TokenExchangeFailed(format!("{} unreachable: {err}", self.label))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = describe_failure(status.as_u16(), &body);
            warn!(status = status.as_u16(), "Token exchange rejected");
            return Err(SoundcheckError::TokenExchangeFailed(reason));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            SoundcheckError::TokenExchangeFailed(format!("unreadable token response: {e}"))
        })?;

        debug!(
            expires_in = token.expires_in,
            has_refresh = token.refresh_token.is_some(),
            "Token exchange accepted"
        );
        Ok(token.into())
    }
}
