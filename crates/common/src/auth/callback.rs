//! Redirect callback parsing
//!
//! The provider redirects back with either `?code=...&state=...`,
//! `?error=...`, or (legacy implicit grant) `#access_token=...`. Parsing is
//! pure; deciding what to do with the outcome is the flow controller's job.

use std::borrow::Cow;

use thiserror::Error;
use url::Url;

/// Base used to resolve path-only callbacks like `/callback?code=x`
const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackParseError {
    #[error("Invalid callback URL: {0}")]
    InvalidUrl(String),
}

/// What a redirect callback carried, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// `error` parameter, from the query or (implicit grant) the fragment
    Error { error: String, description: Option<String> },
    /// Authorization code in the query
    Code { code: String, state: Option<String> },
    /// Deprecated implicit-grant token in the fragment
    ImplicitToken { access_token: String, expires_in: Option<i64> },
    /// Nothing usable
    Empty,
}

#[derive(Debug, Default)]
struct Params {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    access_token: Option<String>,
    expires_in: Option<String>,
}

impl Params {
    fn collect<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                "access_token" => &mut params.access_token,
                "expires_in" => &mut params.expires_in,
                _ => continue,
            };
            // First occurrence wins
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// Parse a redirect callback URL.
///
/// Absolute URLs and path-only URLs are both accepted.
///
/// # Errors
///
/// Returns `CallbackParseError::InvalidUrl` when the input cannot be parsed
/// as a URL at all.
pub fn parse_callback(callback_url: &str) -> Result<CallbackOutcome, CallbackParseError> {
    let url = match Url::parse(callback_url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| base.join(callback_url))
            .map_err(|e| CallbackParseError::InvalidUrl(e.to_string()))?,
        Err(e) => return Err(CallbackParseError::InvalidUrl(e.to_string())),
    };

    let query = Params::collect(url.query_pairs());
    let fragment = url
        .fragment()
        .map(|f| Params::collect(url::form_urlencoded::parse(f.as_bytes())))
        .unwrap_or_default();

    if let Some(error) = query.error {
        return Ok(CallbackOutcome::Error { error, description: query.error_description });
    }
    if let Some(error) = fragment.error {
        return Ok(CallbackOutcome::Error { error, description: fragment.error_description });
    }
    if let Some(code) = query.code {
        return Ok(CallbackOutcome::Code { code, state: query.state });
    }
    if let Some(access_token) = fragment.access_token {
        let expires_in = fragment.expires_in.and_then(|s| s.parse().ok());
        return Ok(CallbackOutcome::ImplicitToken { access_token, expires_in });
    }

    Ok(CallbackOutcome::Empty)
}
