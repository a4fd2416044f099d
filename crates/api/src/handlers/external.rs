//! Handlers for the API-key-gated external API.
//!
//! These are the consumers of the access-control gate: trusted integrations
//! (booking kiosks, wearable bridges, partner tooling) authenticate with an
//! API key instead of a user session.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use coachkit_core::security::severities;
use coachkit_core::types::DbId;
use coachkit_db::models::security_event::CreateSecurityEvent;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::api_key::{RequireKeyRead, RequireKeyWrite};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

/// Identity echo for a successfully authorized key.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub key_id: DbId,
    pub key_prefix: String,
    pub owner_id: DbId,
    pub permissions: Vec<String>,
}

/// GET /api/v1/external/whoami
///
/// Echo the authorized key's identity. Requires the `read` permission.
pub async fn whoami(RequireKeyRead(identity): RequireKeyRead) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: WhoAmIResponse {
            key_id: identity.key_id,
            key_prefix: identity.key_prefix,
            owner_id: identity.owner_id,
            permissions: identity.permissions,
        },
    }))
}

// ---------------------------------------------------------------------------
// Event intake
// ---------------------------------------------------------------------------

/// Request body for integration-submitted security events.
#[derive(Debug, Deserialize)]
pub struct SubmitEventRequest {
    pub event_type: String,
    /// Defaults to `low` when absent or unrecognized.
    pub severity: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// POST /api/v1/external/events
///
/// Let a trusted integration submit a security event. The risk score is
/// computed server-side; the submitting key is recorded as the actor.
/// Requires the `write` permission.
pub async fn submit_event(
    RequireKeyWrite(identity): RequireKeyWrite,
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Json(input): Json<SubmitEventRequest>,
) -> AppResult<impl IntoResponse> {
    if input.event_type.trim().is_empty() {
        return Err(AppError::BadRequest("event_type must not be empty".into()));
    }

    let event = audit::record_event(
        &state.pool,
        CreateSecurityEvent {
            event_type: input.event_type.trim().to_string(),
            severity: input
                .severity
                .unwrap_or_else(|| severities::LOW.to_string()),
            user_id: None,
            api_key_id: Some(identity.key_id),
            source_ip: crate::request_meta::source_ip(&headers),
            user_agent: crate::request_meta::user_agent(&headers),
            endpoint: Some("/api/v1/external/events".to_string()),
            http_method: Some(method.to_string()),
            details: input.details,
        },
    )
    .await;

    // Recording *is* the business action here, so a swallowed persistence
    // failure surfaces as a server error to the integration.
    let event = event.ok_or_else(|| {
        AppError::InternalError("Failed to record security event".into())
    })?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}
