//! API integration tests

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use reqwest::Client;
use serde_json::{json, Value};
use tower::ServiceExt;

use library_card_server::{
    api::create_router,
    models::{Card, CardType, NewCard},
    repository::{CardStore, MemoryCardStore, StoreError, StoreResult},
    services::Services,
    AppConfig, AppState,
};

const BASE_URL: &str = "http://localhost:8000";

fn app() -> Router {
    let store = Arc::new(MemoryCardStore::new());
    create_router(AppState::new(AppConfig::default(), Services::new(store)))
}

/// Card store whose every call fails as if the database were unreachable
struct UnreachableStore;

fn unreachable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl CardStore for UnreachableStore {
    async fn find_all(&self) -> StoreResult<Vec<Card>> {
        Err(unreachable())
    }

    async fn find_by_identity(
        &self,
        _name: &str,
        _department: &str,
        _card_type: CardType,
    ) -> StoreResult<Option<Card>> {
        Err(unreachable())
    }

    async fn insert(&self, _card: &NewCard) -> StoreResult<i32> {
        Err(unreachable())
    }

    async fn find_by_id(&self, _id: i32) -> StoreResult<Option<Card>> {
        Err(unreachable())
    }

    async fn delete_by_id(&self, _id: i32) -> StoreResult<bool> {
        Err(unreachable())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(unreachable())
    }

    async fn release(&self) {}
}

fn unreachable_app() -> Router {
    create_router(AppState::new(
        AppConfig::default(),
        Services::new(Arc::new(UnreachableStore)),
    ))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn post_raw(app: &Router, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/card")
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

fn content_type(response: &Response) -> &str {
    response.headers()[header::CONTENT_TYPE].to_str().unwrap()
}

#[tokio::test]
async fn test_create_card_then_duplicate() {
    let app = app();
    let card = json!({"name": "Alice", "department": "CS", "type": "学生", "op": "new"});

    let response = send(&app, Method::POST, "/card", Some(card.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(content_type(&response).starts_with("text/plain"));
    assert_eq!(body_text(response).await, "Successfully created a card.");

    let response = send(&app, Method::POST, "/card", Some(card)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "The card already exists!");

    let response = send(&app, Method::GET, "/card", None).await;
    let cards: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(cards.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_cards_normalizes_types() {
    let app = app();
    for (name, label) in [("Alice", "学生"), ("Bob", "教师"), ("Carol", "T")] {
        let body = json!({"name": name, "department": "CS", "type": label, "op": "new"});
        send(&app, Method::POST, "/card", Some(body)).await;
    }

    let response = send(&app, Method::GET, "/card", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(content_type(&response).starts_with("application/json"));

    let cards: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let types: Vec<&str> = cards
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["S", "T", "T"]);
    assert!(cards[0]["id"].is_number());
    assert_eq!(cards[0]["name"], "Alice");
    assert_eq!(cards[0]["department"], "CS");
}

#[tokio::test]
async fn test_remove_card() {
    let app = app();
    let body = json!({"name": "Alice", "department": "CS", "type": "S", "op": "new"});
    send(&app, Method::POST, "/card", Some(body)).await;

    let response = send(&app, Method::GET, "/card", None).await;
    let cards: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let id = cards[0]["id"].as_i64().unwrap();

    let response = send(&app, Method::POST, "/card", Some(json!({"id": id, "op": "remove"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Successfully removed the card.");

    let response = send(&app, Method::GET, "/card", None).await;
    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn test_remove_missing_card() {
    let app = app();
    let response = send(&app, Method::POST, "/card", Some(json!({"id": 42, "op": "remove"}))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Card 42 does not exist.");
}

#[tokio::test]
async fn test_invalid_operation() {
    let app = app();
    let response = send(&app, Method::POST, "/card", Some(json!({"op": "borrow"}))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Invalid operation.");
}

#[tokio::test]
async fn test_invalid_fields_are_reported_in_body() {
    let app = app();

    let body = json!({"name": "Alice", "department": "CS", "type": "Professor", "op": "new"});
    let response = send(&app, Method::POST, "/card", Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Unknown card type"));

    let body = json!({"department": "CS", "type": "S", "op": "new"});
    let response = send(&app, Method::POST, "/card", Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "The card holder's name must not be empty."
    );

    let response = send(&app, Method::GET, "/card", None).await;
    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = app();

    for body in ["{not json", r#"{"name":"Alice"}"#, r#"{"op":"new","extra":1}"#] {
        let response = post_raw(&app, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
        let error: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(error["error"].as_str().unwrap().starts_with("Invalid card request"));
    }
}

#[tokio::test]
async fn test_preflight() {
    let app = app();
    let response = send(&app, Method::OPTIONS, "/card", None).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors(&response);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_unsupported_methods() {
    let app = app();
    for method in [Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
        let response = send(&app, method, "/card", None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
        assert!(body_text(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app();

    let response = send(&app, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");

    let response = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_list_cards_with_unreachable_store() {
    let app = unreachable_app();
    let response = send(&app, Method::GET, "/card", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert!(content_type(&response).starts_with("application/json"));
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"error": "Failed to access the card store."}));
}

#[tokio::test]
async fn test_readiness_with_unreachable_store() {
    let app = unreachable_app();
    let response = send(&app, Method::GET, "/ready", None).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_cors(&response);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Failed to access the card store.");
}

#[tokio::test]
async fn test_card_operations_with_unreachable_store() {
    let app = unreachable_app();

    let body = json!({"name": "Alice", "department": "CS", "type": "S", "op": "new"});
    let response = send(&app, Method::POST, "/card", Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Failed to access the card store.");

    let response = send(&app, Method::POST, "/card", Some(json!({"id": 1, "op": "remove"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Failed to access the card store.");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();
    let response = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(doc["paths"]["/card"]["post"].is_object());
    assert!(doc["components"]["schemas"]["Card"].is_object());
}

// Live-server tests. Start the server first, then run with: cargo test -- --ignored

#[tokio::test]
#[ignore]
async fn test_live_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_live_create_and_remove_card() {
    let client = Client::new();

    let response = client
        .post(format!("{}/card", BASE_URL))
        .json(&json!({
            "name": "Integration",
            "department": "QA",
            "type": "教师",
            "op": "new"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.expect("Failed to read response"),
        "Successfully created a card."
    );

    let cards: Value = client
        .get(format!("{}/card", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let id = cards
        .as_array()
        .expect("Card list is not an array")
        .iter()
        .find(|c| c["name"] == "Integration" && c["department"] == "QA" && c["type"] == "T")
        .and_then(|c| c["id"].as_i64())
        .expect("Created card not listed");

    let response = client
        .post(format!("{}/card", BASE_URL))
        .json(&json!({ "id": id, "op": "remove" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(
        response.text().await.expect("Failed to read response"),
        "Successfully removed the card."
    );
}
