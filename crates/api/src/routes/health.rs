//! Liveness probe

use axum::response::IntoResponse;
use axum::Json;

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
