//! Integration tests for API-key authentication
//!
//! Tests: public routes, key carriers, status mapping for every denial kind,
//! store failures, typed extractor routes

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use vito_api::{ApiKey, AppState, RequiredScope, build_router};
use vito_auth::test_utils::{FailingStore, generate_test_key, record_for_key};
use vito_auth::{CredentialRecord, MemoryCredentialStore};

const SCOPE: &str = "api:read";

struct Financial;

impl RequiredScope for Financial {
    const SCOPE: &'static str = "agents:financial";
}

fn test_app(records: Vec<CredentialRecord>) -> Router {
    let store = MemoryCredentialStore::new();
    for record in records {
        store.insert(record);
    }
    build_router(AppState::from_store(Arc::new(store)), SCOPE)
}

fn get_request(uri: &str) -> axum::http::request::Builder {
    Request::builder().method(Method::GET).uri(uri)
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(json!({}))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, response_json(response).await)
}

// =============================================================================
// Public routes
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app(vec![]);

    let (status, body) = send(app, get_request("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app(vec![]);

    let response = app
        .oneshot(get_request("/api/v1/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_bearer_key() {
    let key = generate_test_key("test");
    let mut record = record_for_key("key-1", "tenant-1", &key, &[SCOPE]);
    record.rate_limit_per_minute = 300;
    let app = test_app(vec![record]);

    let request = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, format!("Bearer {}", key))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_id"], "tenant-1");
    assert_eq!(body["key_id"], "key-1");
    assert_eq!(body["scopes"], json!([SCOPE]));
    assert_eq!(body["rate_limit_per_minute"], 300);
    assert!(body["correlation_id"].is_string());
}

#[tokio::test]
async fn test_x_api_key_header() {
    let key = generate_test_key("test");
    let app = test_app(vec![record_for_key("key-1", "tenant-1", &key, &[SCOPE])]);

    let request = get_request("/api/v1/key")
        .header("x-api-key", key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key_id"], "key-1");
}

#[tokio::test]
async fn test_non_bearer_authorization_falls_back_to_x_api_key() {
    let key = generate_test_key("test");
    let app = test_app(vec![record_for_key("key-1", "tenant-1", &key, &[SCOPE])]);

    let request = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .header("x-api-key", key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Authentication failures (401)
// =============================================================================

#[tokio::test]
async fn test_missing_key() {
    let app = test_app(vec![]);

    let (status, body) = send(app, get_request("/api/v1/key").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_malformed_and_unknown_keys_are_indistinguishable() {
    let malformed = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, "Bearer short")
        .body(Body::empty())
        .unwrap();
    let unknown = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, format!("Bearer {}", generate_test_key("test")))
        .body(Body::empty())
        .unwrap();

    let (status_a, body_a) = send(test_app(vec![]), malformed).await;
    let (status_b, body_b) = send(test_app(vec![]), unknown).await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_a, status_b);
    assert_eq!(body_a, body_b);
    assert_eq!(body_a["error"], "INVALID_API_KEY");
}

#[tokio::test]
async fn test_inactive_key() {
    let key = generate_test_key("test");
    let mut record = record_for_key("key-1", "tenant-1", &key, &[SCOPE]);
    record.is_active = false;
    let app = test_app(vec![record]);

    let request = get_request("/api/v1/key")
        .header("x-api-key", key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_API_KEY");
    assert_eq!(body["message"], "API key not found or inactive");
}

#[tokio::test]
async fn test_expired_key() {
    let key = generate_test_key("test");
    let mut record = record_for_key("key-1", "tenant-1", &key, &[SCOPE]);
    record.expires_at = Some(Utc::now() - Duration::minutes(5));
    let app = test_app(vec![record]);

    let request = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, format!("Bearer {}", key))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "API_KEY_EXPIRED");
    assert_eq!(body["message"], "API key expired");
}

// =============================================================================
// Authorization failures (403)
// =============================================================================

#[tokio::test]
async fn test_insufficient_scope() {
    let key = generate_test_key("test");
    let app = test_app(vec![record_for_key(
        "key-1",
        "tenant-1",
        &key,
        &["voice:synthesis"],
    )]);

    let request = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, format!("Bearer {}", key))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "INSUFFICIENT_SCOPE");
    assert_eq!(body["message"], "Insufficient scope. Required: api:read");
}

#[tokio::test]
async fn test_policy_check() {
    let key = generate_test_key("test");
    let mut record = record_for_key("key-1", "tenant-1", &key, &[SCOPE]);
    record.allowed_providers = vec!["openai".to_string()];
    let app = test_app(vec![record]);

    let allowed = get_request("/api/v1/key/policy?provider=openai&model=gpt-4o")
        .header("x-api-key", key.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.clone(), allowed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);

    let denied = get_request("/api/v1/key/policy?provider=anthropic")
        .header("x-api-key", key.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, denied).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "PROVIDER_NOT_ALLOWED");
    assert_eq!(body["message"], "Provider not allowed: anthropic");
}

// =============================================================================
// Infrastructure failures (503)
// =============================================================================

#[tokio::test]
async fn test_store_unavailable() {
    let app = build_router(AppState::from_store(Arc::new(FailingStore)), SCOPE);

    let request = get_request("/api/v1/key")
        .header(header::AUTHORIZATION, format!("Bearer {}", generate_test_key("test")))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "AUTH_UNAVAILABLE");
}

// =============================================================================
// Typed extractor
// =============================================================================

async fn financial_handler(key: ApiKey<Financial>) -> Json<Value> {
    Json(json!({ "tenant": key.tenant_id(), "scope": key.scope() }))
}

fn typed_app(records: Vec<CredentialRecord>) -> Router {
    let store = MemoryCredentialStore::new();
    for record in records {
        store.insert(record);
    }
    Router::new()
        .route("/agents", get(financial_handler))
        .with_state(AppState::from_store(Arc::new(store)))
}

#[tokio::test]
async fn test_typed_extractor_allows_scope() {
    let key = generate_test_key("test");
    let app = typed_app(vec![record_for_key(
        "key-1",
        "tenant-1",
        &key,
        &["agents:financial"],
    )]);

    let request = get_request("/agents")
        .header(header::AUTHORIZATION, format!("Bearer {}", key))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"], "tenant-1");
    assert_eq!(body["scope"], "agents:financial");
}

#[tokio::test]
async fn test_typed_extractor_rejects_scope() {
    let key = generate_test_key("test");
    let app = typed_app(vec![record_for_key("key-1", "tenant-1", &key, &[SCOPE])]);

    let request = get_request("/agents")
        .header(header::AUTHORIZATION, format!("Bearer {}", key))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient scope. Required: agents:financial");
}
