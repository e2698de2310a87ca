//! Card API endpoints
//!
//! `/card` keeps the contract existing browser clients rely on: outcomes of
//! card operations are reported in the body with status 200, and only
//! undecodable requests get an error status.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::card::{CardCommand, CardRequest},
    AppState,
};

pub const CARD_CREATED: &str = "Successfully created a card.";
pub const CARD_REMOVED: &str = "Successfully removed the card.";
pub const INVALID_OPERATION: &str = "Invalid operation.";

/// List all cards
#[utoipa::path(
    get,
    path = "/card",
    tag = "cards",
    responses(
        (status = 200, description = "Card list, or an error object if the store failed", body = Vec<crate::models::card::Card>)
    )
)]
pub async fn list_cards(State(state): State<AppState>) -> Response {
    match state.services.cards.list_cards().await {
        Ok(cards) => Json(cards).into_response(),
        Err(e) => Json(ErrorResponse::new(e.to_string())).into_response(),
    }
}

/// Create or remove a card
#[utoipa::path(
    post,
    path = "/card",
    tag = "cards",
    request_body = CardRequest,
    responses(
        (status = 200, description = "Outcome message", body = String, content_type = "text/plain"),
        (status = 400, description = "Body is not a valid card request", body = ErrorResponse)
    )
)]
pub async fn post_card(State(state): State<AppState>, body: Bytes) -> AppResult<String> {
    let request = CardRequest::from_json(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed card request");
        AppError::BadRequest(format!("Invalid card request: {}", e))
    })?;

    tracing::debug!(op = %request.op, id = ?request.id, "Received card request");

    let cards = &state.services.cards;
    let message = match request.into_command() {
        Ok(CardCommand::New(candidate)) => match cards.register_card(candidate).await {
            Ok(_) => CARD_CREATED.to_string(),
            Err(e) => e.to_string(),
        },
        Ok(CardCommand::Remove { id }) => match cards.remove_card(id).await {
            Ok(()) => CARD_REMOVED.to_string(),
            Err(e) => {
                tracing::info!(id, reason = %e, "Failed to remove the card");
                e.to_string()
            }
        },
        Ok(CardCommand::Unsupported(op)) => {
            tracing::warn!(op = %op, "Unsupported card operation");
            INVALID_OPERATION.to_string()
        }
        Err(e) => e.to_string(),
    };

    Ok(message)
}

/// CORS preflight
#[utoipa::path(
    options,
    path = "/card",
    tag = "cards",
    responses(
        (status = 204, description = "Preflight accepted")
    )
)]
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
