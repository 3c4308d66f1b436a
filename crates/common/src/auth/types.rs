//! OAuth 2.0 types and structures
//!
//! Token, configuration and exchange-request types shared by the flow
//! controller, the exchangers and the token-exchange intermediary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pkce::PkcePair;

/// OAuth 2.0 access token with metadata
///
/// `refresh_token` is kept when the provider issues one but nothing in the
/// session lifecycle consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer" for this provider)
    pub token_type: String,

    /// Access token lifetime in seconds (0 when unknown)
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    #[must_use]
    pub fn new(
        access_token: String,
        expires_in: i64,
        refresh_token: Option<String>,
        scope: Option<String>,
    ) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            refresh_token,
            scope,
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold. Tokens without an expiry never report expired.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Utc::now() + chrono::Duration::seconds(threshold_seconds) >= expires_at
            }
            None => false,
        }
    }
}

/// Token endpoint response (RFC 6749 §5.1)
///
/// The intermediary passes the provider body through untouched, so only
/// `access_token` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.expires_in,
            response.refresh_token,
            response.scope,
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

/// Authorization request configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    /// Provider authorize endpoint, e.g. `https://accounts.spotify.com/authorize`
    pub authorize_url: String,
    pub scopes: Vec<String>,
    /// Ask the provider to show the consent dialog again
    pub show_dialog: bool,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(
        client_id: String,
        redirect_uri: String,
        authorize_url: String,
        scopes: Vec<String>,
    ) -> Self {
        Self { client_id, redirect_uri, authorize_url, scopes, show_dialog: false }
    }

    #[must_use]
    pub fn with_show_dialog(mut self, show_dialog: bool) -> Self {
        self.show_dialog = show_dialog;
        self
    }

    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Build the authorization redirect URL for one login attempt.
    #[must_use]
    pub fn authorization_url(&self, pkce: &PkcePair, state: &str) -> String {
        let scope_string = self.scope_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", scope_string.as_str()),
            ("code_challenge_method", pkce.challenge_method()),
            ("code_challenge", pkce.challenge.as_str()),
            ("state", state),
        ];

        if self.show_dialog {
            params.push(("show_dialog", "true"));
        }

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.authorize_url, query_string)
    }
}

/// OAuth error response from the authorization server (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// Body sent to a code-for-token exchange path
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenExchangeRequest {
    #[serde(rename = "code")]
    pub authorization_code: String,
    pub code_verifier: String,
    pub redirect_uri: String,
    pub client_id: String,
}

impl TokenExchangeRequest {
    /// Form fields for the provider token endpoint, `grant_type` included.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("grant_type", "authorization_code"),
            ("code", self.authorization_code.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("code_verifier", self.code_verifier.as_str()),
        ]
    }
}

impl fmt::Debug for TokenExchangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchangeRequest")
            .field("authorization_code", &"<redacted>")
            .field("code_verifier", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// The one outstanding login attempt, persisted across the redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub verifier: String,
    /// Echoed back by the provider on the callback
    pub state: String,
    pub created_at: DateTime<Utc>,
}

impl PendingAuthorization {
    #[must_use]
    pub fn new(verifier: String, state: String) -> Self {
        Self { verifier, state, created_at: Utc::now() }
    }
}
