//! Handlers for the security event log and reporting endpoints.
//!
//! All endpoints require the admin role.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use coachkit_core::error::CoreError;
use coachkit_core::reporting::{effective_window, window_duration};
use coachkit_core::security::severities;
use coachkit_core::types::DbId;
use coachkit_db::models::security_event::{
    BucketCount, IpActivity, SecurityEventPage, SecurityEventQuery, UserActivity,
};
use coachkit_db::repositories::SecurityEventRepo;
use coachkit_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

/// Query parameters for security event queries.
#[derive(Debug, Deserialize)]
pub struct SecurityEventListParams {
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub resolved: Option<bool>,
    pub user_id: Option<DbId>,
    pub api_key_id: Option<DbId>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for report endpoints.
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    /// Lookback window token: `1h`, `24h`, `7d`, or `30d`.
    /// Anything else defaults to `24h`.
    pub window: Option<String>,
}

/// Request body for resolving an event.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Report payloads
// ---------------------------------------------------------------------------

/// Per-severity event counts. All four buckets are always present and sum to
/// the window's total.
#[derive(Debug, Default, Serialize)]
pub struct SeverityBreakdown {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
}

impl SeverityBreakdown {
    fn from_buckets(buckets: &[BucketCount]) -> Self {
        let mut breakdown = Self::default();
        for bucket in buckets {
            match bucket.bucket.as_str() {
                severities::LOW => breakdown.low = bucket.count,
                severities::MEDIUM => breakdown.medium = bucket.count,
                severities::HIGH => breakdown.high = bucket.count,
                severities::CRITICAL => breakdown.critical = bucket.count,
                _ => {}
            }
        }
        breakdown
    }
}

/// Summary statistics for a report window.
///
/// Deliberately timestamp-free: two calls over unchanged data produce
/// identical payloads.
#[derive(Debug, Serialize)]
pub struct SecurityReport {
    /// The window token actually applied.
    pub window: &'static str,
    pub total_events: i64,
    pub severity_counts: SeverityBreakdown,
    /// Counts per event type seen in the window.
    pub event_counts: BTreeMap<String, i64>,
    pub average_risk_score: f64,
}

/// Report summary plus the top-offender breakdowns.
#[derive(Debug, Serialize)]
pub struct SecurityOverview {
    #[serde(flatten)]
    pub summary: SecurityReport,
    pub top_source_ips: Vec<IpActivity>,
    pub top_users: Vec<UserActivity>,
}

/// Number of groups returned by the top-IP/top-user breakdowns.
const TOP_GROUP_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an optional ISO 8601 timestamp string.
fn parse_timestamp(s: &Option<String>) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
    match s {
        Some(v) => v
            .parse::<chrono::DateTime<chrono::Utc>>()
            .map(Some)
            .map_err(|_| AppError::BadRequest("Invalid date format".into())),
        None => Ok(None),
    }
}

/// Assemble the window summary from the store aggregates.
///
/// The caller supplies `since` so that endpoints combining the summary with
/// other window queries evaluate every aggregate over the same instant.
async fn build_report(
    pool: &DbPool,
    window_token: &str,
    since: chrono::DateTime<chrono::Utc>,
) -> AppResult<SecurityReport> {
    let window = effective_window(window_token);

    let total_events = SecurityEventRepo::count_since(pool, since).await?;
    let severity_buckets = SecurityEventRepo::severity_counts(pool, since).await?;
    let event_buckets = SecurityEventRepo::event_type_counts(pool, since).await?;
    let average_risk_score = SecurityEventRepo::average_risk_score(pool, since).await?;

    let event_counts = event_buckets
        .into_iter()
        .map(|b| (b.bucket, b.count))
        .collect();

    Ok(SecurityReport {
        window,
        total_events,
        severity_counts: SeverityBreakdown::from_buckets(&severity_buckets),
        event_counts,
        average_risk_score,
    })
}

// ---------------------------------------------------------------------------
// Event queries
// ---------------------------------------------------------------------------

/// GET /admin/security/events
///
/// Query security events with filters and pagination, newest first. Admin only.
pub async fn list_events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<SecurityEventListParams>,
) -> AppResult<impl IntoResponse> {
    let query = SecurityEventQuery {
        event_type: params.event_type,
        severity: params.severity,
        resolved: params.resolved,
        user_id: params.user_id,
        api_key_id: params.api_key_id,
        from: parse_timestamp(&params.from)?,
        to: parse_timestamp(&params.to)?,
        limit: params.limit,
        offset: params.offset,
    };

    let items = SecurityEventRepo::query(&state.pool, &query).await?;
    let total = SecurityEventRepo::count(&state.pool, &query).await?;

    Ok(Json(DataResponse {
        data: SecurityEventPage { items, total },
    }))
}

// ---------------------------------------------------------------------------
// Resolution workflow
// ---------------------------------------------------------------------------

/// POST /admin/security/events/{id}/resolve
///
/// Mark an event resolved, stamping the resolving operator and optional
/// notes. Resolving an already-resolved event is a conflict. Admin only.
pub async fn resolve_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(event_id): Path<DbId>,
    Json(input): Json<ResolveRequest>,
) -> AppResult<impl IntoResponse> {
    let resolved =
        SecurityEventRepo::resolve(&state.pool, event_id, admin.user_id, input.notes.as_deref())
            .await?;

    let Some(event) = resolved else {
        // Distinguish "no such event" from "already resolved".
        return match SecurityEventRepo::find_by_id(&state.pool, event_id).await? {
            Some(_) => Err(AppError::Core(CoreError::Conflict(format!(
                "Security event {event_id} is already resolved"
            )))),
            None => Err(AppError::Core(CoreError::NotFound {
                entity: "SecurityEvent",
                id: event_id,
            })),
        };
    };

    tracing::info!(
        event_id,
        resolved_by = admin.user_id,
        "Security event resolved",
    );

    Ok(Json(DataResponse { data: event }))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// GET /admin/security/report?window=24h
///
/// Window summary: totals, severity buckets, per-event-type counts, mean
/// risk score. Admin only.
pub async fn report(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ReportParams>,
) -> AppResult<impl IntoResponse> {
    let token = params.window.as_deref().unwrap_or("");
    let since = chrono::Utc::now() - window_duration(token);
    let summary = build_report(&state.pool, token, since).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// GET /admin/security/overview?window=24h
///
/// Window summary plus top-10 source IPs and user actors by event count.
/// Admin only.
pub async fn overview(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ReportParams>,
) -> AppResult<impl IntoResponse> {
    let token = params.window.as_deref().unwrap_or("");
    let since = chrono::Utc::now() - window_duration(token);

    let summary = build_report(&state.pool, token, since).await?;
    let top_source_ips = SecurityEventRepo::top_source_ips(&state.pool, since, TOP_GROUP_LIMIT).await?;
    let top_users = SecurityEventRepo::top_users(&state.pool, since, TOP_GROUP_LIMIT).await?;

    Ok(Json(DataResponse {
        data: SecurityOverview {
            summary,
            top_source_ips,
            top_users,
        },
    }))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let parsed = parse_timestamp(&Some("2026-08-01T12:00:00Z".to_string()))
            .expect("valid timestamp should parse");
        assert!(parsed.is_some());

        let parsed = parse_timestamp(&None).expect("absent timestamp is fine");
        assert!(parsed.is_none());
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        let result = parse_timestamp(&Some("yesterday".to_string()));
        assert_matches!(result, Err(AppError::BadRequest(_)));
    }

    #[test]
    fn severity_breakdown_fills_missing_buckets() {
        let buckets = vec![
            BucketCount {
                bucket: "low".to_string(),
                count: 3,
            },
            BucketCount {
                bucket: "critical".to_string(),
                count: 1,
            },
        ];
        let breakdown = SeverityBreakdown::from_buckets(&buckets);
        assert_eq!(breakdown.low, 3);
        assert_eq!(breakdown.medium, 0);
        assert_eq!(breakdown.high, 0);
        assert_eq!(breakdown.critical, 1);
    }

    #[test]
    fn severity_breakdown_ignores_unknown_buckets() {
        let buckets = vec![BucketCount {
            bucket: "apocalyptic".to_string(),
            count: 7,
        }];
        let breakdown = SeverityBreakdown::from_buckets(&buckets);
        assert_eq!(breakdown.low + breakdown.medium + breakdown.high + breakdown.critical, 0);
    }
}
