//! Error types used throughout the application
//!
//! Every controller and API-client operation resolves to either a success
//! payload or one of these tagged failures. Provider responses are normalized
//! into this shape before they reach a caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Soundcheck
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum SoundcheckError {
    /// The provider reported an `error` parameter on the callback (consent
    /// denied, invalid scope, ...), or the callback carried nothing usable.
    #[error("Authorization error: {0}")]
    AuthError(String),

    /// A callback arrived with a code but no verifier is pending.
    #[error("No pending PKCE verifier for this callback")]
    MissingVerifier,

    /// Every configured exchange path failed or timed out.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The exchange completed for a login that has since been superseded.
    #[error("Token exchange was superseded by a newer login")]
    StaleExchange,

    #[error("Request failed: {message}")]
    RequestFailed { status: Option<u16>, message: String },

    #[error("Too many requests (retry after {retry_after_secs:?}s)")]
    TooManyRequests { retry_after_secs: Option<u64> },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SoundcheckError {
    /// Shorthand for a `RequestFailed` without an HTTP status (transport
    /// failures, undecodable bodies).
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed { status: None, message: message.into() }
    }

    /// Stable label suitable for logging and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthError(_) => "auth_error",
            Self::MissingVerifier => "missing_verifier",
            Self::TokenExchangeFailed(_) => "token_exchange_failed",
            Self::StaleExchange => "stale_exchange",
            Self::RequestFailed { .. } => "request_failed",
            Self::TooManyRequests { .. } => "too_many_requests",
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
        }
    }

    /// Retry hint carried by a rate-limit response.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::TooManyRequests { retry_after_secs } => {
                retry_after_secs.map(Duration::from_secs)
            }
            _ => None,
        }
    }

    /// Whether a caller may reasonably try the same operation again later.
    ///
    /// The client never acts on this itself; backoff policy belongs to the
    /// caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TooManyRequests { .. } => true,
            Self::RequestFailed { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }

    /// Whether the user has to go back through the login entry point.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::AuthError(_)
                | Self::MissingVerifier
                | Self::StaleExchange
                | Self::TokenExchangeFailed(_)
                | Self::Unauthenticated
        )
    }
}

/// Result type alias for Soundcheck operations
pub type Result<T> = std::result::Result<T, SoundcheckError>;
