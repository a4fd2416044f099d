//! Domain error type shared by the repository and API layers.

use crate::types::DbId;

/// Domain-level errors for the security core.
///
/// `Unauthorized` carries credential failures from the API-key gate
/// (unknown, revoked, or expired keys) and from token validation;
/// `Forbidden` carries policy denials (allow-list misses, missing
/// permissions, non-admin roles). `Conflict` covers the one-shot
/// transitions: resolving an already-resolved event or revoking an
/// already-revoked key.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A lookup by id came back empty (security events, API keys).
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Caller-supplied input failed validation before persistence.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested state transition has already happened.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No usable credential was presented, or it failed verification.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The credential is valid but not permitted to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
