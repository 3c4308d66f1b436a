use std::time::Duration;

use soundcheck_domain::SoundcheckError;
use tracing::{info, warn};

/// Log the outcome of one `/api/token` request with structured fields.
///
/// # Parameters
/// * `outcome` - Stable outcome identifier (`"exchanged"`, `"missing_parameters"`,
///   `"upstream_rejected"`, `"upstream_unreachable"`).
/// * `upstream_status` - Provider status code, when the provider answered.
/// * `elapsed` - Time spent handling the request.
///
/// Callers must never pass the authorization code or the verifier here.
#[inline]
pub fn log_exchange_outcome(outcome: &str, upstream_status: Option<u16>, elapsed: Duration) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if outcome == "exchanged" {
        info!(outcome, upstream_status, duration_ms, "token_exchange_success");
    } else {
        warn!(outcome, upstream_status, duration_ms, "token_exchange_failure");
    }
}

/// Convert a `SoundcheckError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &SoundcheckError) -> &'static str {
    error.label()
}
