//! HTTP routes for the token-exchange service

pub mod health;
pub mod token;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::context::ExchangeContext;

/// Build the service router
///
/// CORS admits only the configured origin, `POST`/`OPTIONS`, and the
/// `Content-Type` header.
pub fn router(context: ExchangeContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(context.allowed_origin.clone())
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/token",
            post(token::exchange_token)
                .options(token::preflight)
                .fallback(token::method_not_allowed),
        )
        .route("/health", get(health::health_check))
        .layer(cors)
        .with_state(context)
}
