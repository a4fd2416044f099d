//! Admin handlers for API key management.
//!
//! All endpoints require the admin role via [`RequireAdmin`]. The plaintext
//! key is returned **only** on creation; subsequent queries expose only the
//! `key_prefix` for identification. Creation and revocation are audited;
//! listing is not.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use coachkit_core::api_keys::{
    generate_api_key, is_valid_permission, DEFAULT_RATE_LIMIT_REQUESTS,
    DEFAULT_RATE_LIMIT_WINDOW_MS,
};
use coachkit_core::error::CoreError;
use coachkit_core::security::{event_types, severities};
use coachkit_core::types::DbId;
use coachkit_db::models::api_key::{ApiKeyCreatedResponse, CreateApiKey};
use coachkit_db::models::security_event::CreateSecurityEvent;
use coachkit_db::repositories::ApiKeyRepo;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, RequireAdmin};
use crate::request_meta;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the audit event for a key lifecycle action (creation/revocation).
fn key_lifecycle_event(
    event_type: &str,
    severity: &str,
    admin: &AuthUser,
    key_id: DbId,
    key_prefix: &str,
    headers: &HeaderMap,
    method: &Method,
    endpoint: &str,
) -> CreateSecurityEvent {
    CreateSecurityEvent {
        event_type: event_type.to_string(),
        severity: severity.to_string(),
        user_id: Some(admin.user_id),
        api_key_id: Some(key_id),
        source_ip: request_meta::source_ip(headers),
        user_agent: request_meta::user_agent(headers),
        endpoint: Some(endpoint.to_string()),
        http_method: Some(method.to_string()),
        details: Some(json!({ "key_prefix": key_prefix })),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/api-keys
///
/// Generate a new API key. The plaintext key is returned exactly once.
pub async fn create_api_key(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Json(input): Json<CreateApiKey>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if input.permissions.is_empty() {
        return Err(AppError::BadRequest(
            "at least one permission is required".into(),
        ));
    }
    if let Some(unknown) = input.permissions.iter().find(|p| !is_valid_permission(p)) {
        return Err(AppError::BadRequest(format!(
            "Unknown permission: '{unknown}'"
        )));
    }

    // Generate key material.
    let generated = generate_api_key();

    let key = ApiKeyRepo::create(
        &state.pool,
        input.name.trim(),
        &generated.hash,
        &generated.prefix,
        admin.user_id,
        &input.permissions,
        input.endpoint_allow_list.as_deref().unwrap_or(&[]),
        input.ip_allow_list.as_deref().unwrap_or(&[]),
        input.expires_at,
        input
            .rate_limit_requests
            .unwrap_or(DEFAULT_RATE_LIMIT_REQUESTS),
        input
            .rate_limit_window_ms
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MS),
    )
    .await?;

    tracing::info!(
        api_key_id = key.id,
        key_prefix = %generated.prefix,
        user_id = admin.user_id,
        "API key created",
    );

    audit::record_event(
        &state.pool,
        key_lifecycle_event(
            event_types::API_KEY_CREATED,
            severities::LOW,
            &admin,
            key.id,
            &generated.prefix,
            &headers,
            &method,
            "/api/v1/admin/api-keys",
        ),
    )
    .await;

    let response = ApiKeyCreatedResponse {
        id: key.id,
        name: key.name,
        key_prefix: generated.prefix,
        plaintext_key: generated.plaintext,
        permissions: key.permissions,
        expires_at: key.expires_at,
        created_at: key.created_at,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/admin/api-keys
///
/// List all API keys. Shows prefix only, never the full key.
pub async fn list_api_keys(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let keys = ApiKeyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: keys }))
}

/// POST /api/v1/admin/api-keys/{id}/revoke
///
/// Instantly revoke an API key. Sets `revoked_at` and `is_active = false`;
/// the row is retained for the audit trail.
pub async fn revoke_api_key(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Path(key_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let revoked = ApiKeyRepo::revoke(&state.pool, key_id).await?;

    let Some(key) = revoked else {
        return match ApiKeyRepo::find_by_id(&state.pool, key_id).await? {
            Some(_) => Err(AppError::Core(CoreError::Conflict(format!(
                "API key {key_id} is already revoked"
            )))),
            None => Err(AppError::Core(CoreError::NotFound {
                entity: "ApiKey",
                id: key_id,
            })),
        };
    };

    tracing::info!(
        api_key_id = key_id,
        key_prefix = %key.key_prefix,
        user_id = admin.user_id,
        "API key revoked",
    );

    audit::record_event(
        &state.pool,
        key_lifecycle_event(
            event_types::API_KEY_REVOKED,
            severities::MEDIUM,
            &admin,
            key.id,
            &key.key_prefix,
            &headers,
            &method,
            "/api/v1/admin/api-keys/revoke",
        ),
    )
    .await;

    Ok(Json(DataResponse { data: key }))
}
