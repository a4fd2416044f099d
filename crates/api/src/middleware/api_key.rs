//! API-key gate for the external programmatic API.
//!
//! [`ApiKeyAuth`] runs the ordered credential checks; the `RequireKey*`
//! wrappers add the per-endpoint permission requirement at the type level,
//! mirroring the JWT role extractors in [`super::auth`].
//!
//! Every denial except a plainly missing header records a security event via
//! the audit logger. A missing key is treated as a client error, not a
//! security signal: there is nothing to attribute yet.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde_json::json;

use coachkit_core::api_keys::{hash_api_key, permissions};
use coachkit_core::error::CoreError;
use coachkit_core::security::{event_types, severities};
use coachkit_core::types::DbId;
use coachkit_db::models::api_key::ApiKey;
use coachkit_db::models::security_event::CreateSecurityEvent;
use coachkit_db::repositories::ApiKeyRepo;

use crate::audit;
use crate::error::AppError;
use crate::request_meta;
use crate::state::AppState;

/// Header carrying the API key credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Identity of a successfully authorized API key, attached to the request
/// for downstream handlers.
#[derive(Debug, Clone)]
pub struct ApiKeyIdentity {
    pub key_id: DbId,
    pub key_prefix: String,
    pub owner_id: DbId,
    pub permissions: Vec<String>,
}

/// Authorized API key extracted from the `X-API-Key` header.
///
/// Performs the credential checks in order, short-circuiting on the first
/// failure: lookup/active, expiry, IP allow-list, endpoint allow-list.
/// Permission requirements are layered on by the `RequireKey*` wrappers,
/// which also stamp `last_used_at` once every check has passed. A denied
/// request never counts as a use of the credential.
pub struct ApiKeyAuth(pub ApiKeyIdentity);

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                // No credential presented: deny without an audit event.
                AppError::Core(CoreError::Unauthorized("Missing X-API-Key header".into()))
            })?;

        let key = ApiKeyRepo::find_by_hash(&state.pool, &hash_api_key(presented)).await?;

        // Unknown or deactivated credential.
        let Some(key) = key.filter(|k| k.is_active) else {
            audit::record_event(
                &state.pool,
                denial_event(
                    parts,
                    None,
                    event_types::API_KEY_INVALID,
                    severities::LOW,
                    json!({ "reason": "unknown_or_inactive_key" }),
                ),
            )
            .await;
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid API key".into(),
            )));
        };

        // Expiry.
        if key.is_expired(chrono::Utc::now()) {
            audit::record_event(
                &state.pool,
                denial_event(
                    parts,
                    Some(&key),
                    event_types::API_KEY_EXPIRED,
                    severities::LOW,
                    json!({ "reason": "expired_key", "key_prefix": key.key_prefix }),
                ),
            )
            .await;
            return Err(AppError::Core(CoreError::Unauthorized(
                "API key expired".into(),
            )));
        }

        // IP allow-list. A mismatch is escalated: it can indicate a stolen
        // credential used from an unexpected network.
        let source_ip = request_meta::source_ip(&parts.headers);
        if !key.allows_ip(&source_ip) {
            audit::record_event(
                &state.pool,
                denial_event(
                    parts,
                    Some(&key),
                    event_types::SUSPICIOUS_ACTIVITY,
                    severities::HIGH,
                    json!({ "reason": "ip_not_allowed", "key_prefix": key.key_prefix }),
                ),
            )
            .await;
            return Err(AppError::Core(CoreError::Forbidden(
                "API key not permitted from this IP".into(),
            )));
        }

        // Endpoint allow-list.
        let path = parts.uri.path().to_string();
        if !key.allows_endpoint(&path) {
            audit::record_event(
                &state.pool,
                denial_event(
                    parts,
                    Some(&key),
                    event_types::PERMISSION_DENIED,
                    severities::MEDIUM,
                    json!({ "reason": "endpoint_not_allowed", "key_prefix": key.key_prefix }),
                ),
            )
            .await;
            return Err(AppError::Core(CoreError::Forbidden(
                "API key not permitted for this endpoint".into(),
            )));
        }

        Ok(ApiKeyAuth(ApiKeyIdentity {
            key_id: key.id,
            key_prefix: key.key_prefix,
            owner_id: key.owner_id,
            permissions: key.permissions,
        }))
    }
}

/// Build the security event for a gate denial from request metadata.
fn denial_event(
    parts: &Parts,
    key: Option<&ApiKey>,
    event_type: &str,
    severity: &str,
    details: serde_json::Value,
) -> CreateSecurityEvent {
    CreateSecurityEvent {
        event_type: event_type.to_string(),
        severity: severity.to_string(),
        user_id: None,
        api_key_id: key.map(|k| k.id),
        source_ip: request_meta::source_ip(&parts.headers),
        user_agent: request_meta::user_agent(&parts.headers),
        endpoint: Some(parts.uri.path().to_string()),
        http_method: Some(parts.method.to_string()),
        details: Some(details),
    }
}

// ---------------------------------------------------------------------------
// Permission wrappers
// ---------------------------------------------------------------------------

/// Shared permission check for the `RequireKey*` extractors.
async fn require_permission(
    parts: &mut Parts,
    state: &AppState,
    required: &'static str,
) -> Result<ApiKeyIdentity, AppError> {
    let ApiKeyAuth(identity) = ApiKeyAuth::from_request_parts(parts, state).await?;

    if !identity.permissions.iter().any(|p| p == required) {
        audit::record_event(
            &state.pool,
            CreateSecurityEvent {
                event_type: event_types::PERMISSION_DENIED.to_string(),
                severity: severities::MEDIUM.to_string(),
                user_id: None,
                api_key_id: Some(identity.key_id),
                source_ip: request_meta::source_ip(&parts.headers),
                user_agent: request_meta::user_agent(&parts.headers),
                endpoint: Some(parts.uri.path().to_string()),
                http_method: Some(parts.method.to_string()),
                details: Some(json!({
                    "reason": "missing_permission",
                    "required_permission": required,
                    "key_prefix": identity.key_prefix,
                })),
            },
        )
        .await;
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "API key lacks the '{required}' permission"
        ))));
    }

    // Every check has passed; only now does the request count as a use of
    // the credential. The stamp is informational bookkeeping, so a failed
    // update is logged but never fails the request.
    if let Err(err) = ApiKeyRepo::touch_last_used(&state.pool, identity.key_id).await {
        tracing::warn!(
            api_key_id = identity.key_id,
            error = %err,
            "Failed to update API key last_used_at",
        );
    }

    Ok(identity)
}

/// Requires a key carrying the `read` permission.
pub struct RequireKeyRead(pub ApiKeyIdentity);

impl FromRequestParts<AppState> for RequireKeyRead {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = require_permission(parts, state, permissions::READ).await?;
        Ok(RequireKeyRead(identity))
    }
}

/// Requires a key carrying the `write` permission.
pub struct RequireKeyWrite(pub ApiKeyIdentity);

impl FromRequestParts<AppState> for RequireKeyWrite {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = require_permission(parts, state, permissions::WRITE).await?;
        Ok(RequireKeyWrite(identity))
    }
}

/// Requires a key carrying the `admin` permission.
pub struct RequireKeyAdmin(pub ApiKeyIdentity);

impl FromRequestParts<AppState> for RequireKeyAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = require_permission(parts, state, permissions::ADMIN).await?;
        Ok(RequireKeyAdmin(identity))
    }
}
