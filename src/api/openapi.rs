//! OpenAPI documentation

use axum::Json;
use utoipa::OpenApi;

use crate::api::{cards, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Card API",
        version = "0.1.0",
        description = "Library card registration service"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Cards
        cards::list_cards,
        cards::post_card,
        cards::preflight,
    ),
    components(
        schemas(
            crate::models::card::Card,
            crate::models::card::CardType,
            crate::models::card::CardRequest,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "cards", description = "Library card management")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
