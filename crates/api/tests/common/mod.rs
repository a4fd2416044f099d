//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the same application router (with the full middleware stack) that
//! `main.rs` serves, plus request/response helpers and fixtures for JWT
//! tokens and API key credentials.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use coachkit_api::auth::jwt::{generate_access_token, JwtConfig};
use coachkit_api::config::ServerConfig;
use coachkit_api::router::build_app_router;
use coachkit_api::state::AppState;
use coachkit_core::api_keys::generate_api_key;
use coachkit_db::models::api_key::ApiKey;
use coachkit_db::repositories::ApiKeyRepo;

/// Fixed JWT secret used across all integration tests.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-plenty-of-entropy";

/// Build a test `ServerConfig` with safe defaults and the fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Uses [`build_app_router`] so integration tests exercise the exact
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Token fixtures
// ---------------------------------------------------------------------------

/// Generate a valid access token for user 1 with the `admin` role.
pub fn admin_token() -> String {
    token_for(1, "admin")
}

/// Generate a valid access token for an arbitrary user and role.
pub fn token_for(user_id: i64, role: &str) -> String {
    let config = test_config();
    generate_access_token(user_id, role, &config.jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// API key fixtures
// ---------------------------------------------------------------------------

/// Create an API key directly in the database with no allow-list
/// restrictions and no expiry. Returns the stored row and the plaintext key.
pub async fn create_key(pool: &PgPool, name: &str, permissions: &[&str]) -> (ApiKey, String) {
    create_key_full(pool, name, permissions, &[], &[], None).await
}

/// Create an API key with full control over allow-lists and expiry.
pub async fn create_key_full(
    pool: &PgPool,
    name: &str,
    permissions: &[&str],
    endpoint_allow_list: &[&str],
    ip_allow_list: &[&str],
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
) -> (ApiKey, String) {
    let generated = generate_api_key();
    let permissions: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
    let endpoints: Vec<String> = endpoint_allow_list.iter().map(|p| p.to_string()).collect();
    let ips: Vec<String> = ip_allow_list.iter().map(|p| p.to_string()).collect();

    let key = ApiKeyRepo::create(
        pool,
        name,
        &generated.hash,
        &generated.prefix,
        1,
        &permissions,
        &endpoints,
        &ips,
        expires_at,
        100,
        900_000,
    )
    .await
    .expect("key creation should succeed");

    (key, generated.plaintext)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request through the router and return the raw response.
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should not fail")
}

/// GET with no credentials.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// GET with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// GET with an `X-API-Key` header and optional extra headers.
pub async fn get_api_key(
    app: Router,
    uri: &str,
    key: &str,
    extra_headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().uri(uri).header("x-api-key", key);
    for (name, value) in extra_headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::empty()).expect("request should build");
    send(app, request).await
}

/// POST a JSON body with no credentials.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, request).await
}

/// POST a JSON body with a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, request).await
}

/// POST a JSON body with an `X-API-Key` header and optional extra headers.
pub async fn post_json_api_key(
    app: Router,
    uri: &str,
    key: &str,
    extra_headers: &[(&str, &str)],
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-api-key", key)
        .header("content-type", "application/json");
    for (name, value) in extra_headers {
        builder = builder.header(*name, *value);
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request should build");
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert a status and return the parsed JSON body.
pub async fn assert_status_json(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {json}");
    json
}
