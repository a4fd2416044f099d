//! Security event entity models and DTOs.
//!
//! Security events form an append-only audit trail: rows carry a risk score
//! computed once at creation and have no `updated_at` field. Only the
//! resolution workflow touches an existing row, and only its resolution
//! fields.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coachkit_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Security event entity
// ---------------------------------------------------------------------------

/// A single security event record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SecurityEvent {
    pub id: DbId,
    pub event_type: String,
    pub severity: String,
    pub user_id: Option<DbId>,
    pub api_key_id: Option<DbId>,
    pub source_ip: String,
    pub user_agent: Option<String>,
    pub endpoint: Option<String>,
    pub http_method: Option<String>,
    /// Opaque structured payload. Kept as raw JSON so new event types can
    /// attach data without schema changes.
    pub details: Option<serde_json::Value>,
    pub risk_score: i32,
    pub resolved: bool,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub resolution_notes: Option<String>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a new security event.
///
/// The risk score is not part of the DTO: the audit logger computes it from
/// `(event_type, severity, source_ip presence)` and passes it to the repo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSecurityEvent {
    pub event_type: String,
    pub severity: String,
    pub user_id: Option<DbId>,
    pub api_key_id: Option<DbId>,
    pub source_ip: String,
    pub user_agent: Option<String>,
    pub endpoint: Option<String>,
    pub http_method: Option<String>,
    pub details: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for querying security events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityEventQuery {
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub resolved: Option<bool>,
    pub user_id: Option<DbId>,
    pub api_key_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated response for security event queries.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEventPage {
    pub items: Vec<SecurityEvent>,
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Aggregation rows
// ---------------------------------------------------------------------------

/// One `GROUP BY` bucket with its row count (severity or event type).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BucketCount {
    pub bucket: String,
    pub count: i64,
}

/// Per-source-IP activity within a report window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IpActivity {
    pub source_ip: String,
    pub count: i64,
    pub average_risk_score: f64,
}

/// Per-user activity within a report window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserActivity {
    pub user_id: DbId,
    pub count: i64,
    pub average_risk_score: f64,
}
