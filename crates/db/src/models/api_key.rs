//! API key credential models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coachkit_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// API key
// ---------------------------------------------------------------------------

/// A row from the `api_keys` table.
///
/// **Note:** `key_hash` is never serialized to responses. The `key_prefix`
/// field is used for human-readable identification.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub owner_id: DbId,
    /// Subset of `{read, write, admin}`.
    pub permissions: Vec<String>,
    /// Endpoint patterns this key may call. Empty means all endpoints.
    pub endpoint_allow_list: Vec<String>,
    /// Source IPs this key may be used from. Empty means all IPs.
    pub ip_allow_list: Vec<String>,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    /// Advisory quota only; enforcement belongs to external rate limiting.
    pub rate_limit_requests: i32,
    pub rate_limit_window_ms: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ApiKey {
    /// Whether the credential carries the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Whether the credential has passed its expiry, if one is set.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }

    /// Whether `ip` is admitted by the allow-list. An empty list admits
    /// every IP; a non-empty list strictly rejects anything not in it.
    pub fn allows_ip(&self, ip: &str) -> bool {
        self.ip_allow_list.is_empty() || self.ip_allow_list.iter().any(|allowed| allowed == ip)
    }

    /// Whether `path` is admitted by the endpoint allow-list (prefix match).
    /// An empty list admits every endpoint.
    pub fn allows_endpoint(&self, path: &str) -> bool {
        self.endpoint_allow_list.is_empty()
            || self.endpoint_allow_list.iter().any(|p| path.starts_with(p.as_str()))
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a new API key.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKey {
    pub name: String,
    /// Permission names: `"read"`, `"write"`, `"admin"`.
    pub permissions: Vec<String>,
    pub endpoint_allow_list: Option<Vec<String>>,
    pub ip_allow_list: Option<Vec<String>>,
    /// Optional expiry timestamp (ISO 8601).
    pub expires_at: Option<Timestamp>,
    pub rate_limit_requests: Option<i32>,
    pub rate_limit_window_ms: Option<i64>,
}

/// Response returned when a new API key is created.
/// Includes the plaintext key (shown exactly once).
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyCreatedResponse {
    pub id: DbId,
    pub name: String,
    pub key_prefix: String,
    /// The full plaintext key. Shown **once** and never stored.
    pub plaintext_key: String,
    pub permissions: Vec<String>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
