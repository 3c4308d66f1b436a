//! `POST /api/token`: authorization code + verifier for an access token
//!
//! Accepts a form-encoded or JSON body, forwards it to the provider token
//! endpoint as a form POST with `grant_type=authorization_code`, and relays
//! the provider's JSON. The code and verifier are never logged.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::context::ExchangeContext;
use crate::utils::logging::{error_label, log_exchange_outcome};

const MISSING_PARAMETERS: &str = "Missing required parameters";
const EXCHANGE_FAILED: &str = "Failed to exchange code for token";

/// Fields the browser sends
#[derive(Debug, Default, Deserialize)]
struct ExchangeParams {
    code: Option<String>,
    code_verifier: Option<String>,
    redirect_uri: Option<String>,
    client_id: Option<String>,
}

/// All four fields, present and non-empty
struct CompleteParams {
    code: String,
    code_verifier: String,
    redirect_uri: String,
    client_id: String,
}

impl ExchangeParams {
    fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            return serde_json::from_slice(body).unwrap_or_default();
        }

        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match &*key {
                "code" => &mut params.code,
                "code_verifier" => &mut params.code_verifier,
                "redirect_uri" => &mut params.redirect_uri,
                "client_id" => &mut params.client_id,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        params
    }

    fn complete(self) -> Option<CompleteParams> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Some(CompleteParams {
            code: present(self.code)?,
            code_verifier: present(self.code_verifier)?,
            redirect_uri: present(self.redirect_uri)?,
            client_id: present(self.client_id)?,
        })
    }
}

fn exchange_failed(details: Value) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": EXCHANGE_FAILED, "details": details })))
        .into_response()
}

/// `POST /api/token`
pub async fn exchange_token(
    State(context): State<ExchangeContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let Some(params) = ExchangeParams::from_body(&headers, &body).complete() else {
        log_exchange_outcome("missing_parameters", None, started.elapsed());
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": MISSING_PARAMETERS })))
            .into_response();
    };

    debug!(
        code_len = params.code.len(),
        verifier_len = params.code_verifier.len(),
        "Forwarding token exchange"
    );

    let form = [
        ("grant_type", "authorization_code"),
        ("code", params.code.as_str()),
        ("redirect_uri", params.redirect_uri.as_str()),
        ("client_id", params.client_id.as_str()),
        ("code_verifier", params.code_verifier.as_str()),
    ];
    let request = context.http.request(Method::POST, context.token_url.clone()).form(&form);

    let response = match context.http.send(request).await {
        Ok(response) => response,
        Err(err) => {
            debug!(error = error_label(&err), "Token endpoint unreachable");
            log_exchange_outcome("upstream_unreachable", None, started.elapsed());
            return exchange_failed(Value::String(err.to_string()));
        }
    };

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

    if status.is_success() {
        log_exchange_outcome("exchanged", Some(status.as_u16()), started.elapsed());
        (StatusCode::OK, Json(payload)).into_response()
    } else {
        log_exchange_outcome("upstream_rejected", Some(status.as_u16()), started.elapsed());
        exchange_failed(payload)
    }
}

/// Bare `OPTIONS` that is not a CORS preflight
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on `/api/token`
pub async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, Json(json!({ "error": "Method not allowed" }))).into_response()
}
