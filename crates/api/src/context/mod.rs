//! Application context for the token-exchange service

use std::time::Duration;

use axum::http::HeaderValue;
use soundcheck_domain::{Config, Result, SoundcheckError};
use soundcheck_infra::HttpClient;
use tracing::info;
use url::Url;

/// Upstream call budget; the caller's own exchange timeout is the real bound.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state handed to every request handler
#[derive(Clone, Debug)]
pub struct ExchangeContext {
    /// Provider token endpoint
    pub token_url: Url,
    /// The single origin allowed through CORS
    pub allowed_origin: HeaderValue,
    pub http: HttpClient,
}

impl ExchangeContext {
    /// Build the context from the `server` section
    ///
    /// # Errors
    ///
    /// Returns `SoundcheckError::Config` when the token URL or origin is
    /// malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate_server()?;

        let token_url = Url::parse(&config.server.token_url).map_err(|e| {
            SoundcheckError::Config(format!(
                "Invalid server.token_url '{}': {}",
                config.server.token_url, e
            ))
        })?;
        let allowed_origin = HeaderValue::from_str(&config.server.allowed_origin).map_err(|e| {
            SoundcheckError::Config(format!("Invalid server.allowed_origin: {e}"))
        })?;
        let http = HttpClient::builder().timeout(UPSTREAM_TIMEOUT).build()?;

        info!(
            token_url = %token_url,
            allowed_origin = %config.server.allowed_origin,
            "Exchange context ready"
        );

        Ok(Self { token_url, allowed_origin, http })
    }
}
