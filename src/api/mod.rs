//! HTTP layer: routes and response headers

pub mod cards;
pub mod health;
pub mod openapi;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::AppState;

/// Create the application router with all routes
///
/// Every response carries permissive CORS headers so browser clients from
/// any origin can call the API.
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Cards
        .route(
            "/card",
            get(cards::list_cards)
                .post(cards::post_card)
                .options(cards::preflight)
                .head(cards::method_not_allowed)
                .fallback(cards::method_not_allowed),
        )
        // OpenAPI document
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
}
