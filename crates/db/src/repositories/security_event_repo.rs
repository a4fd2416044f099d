//! Repository for the append-only `security_events` table.

use sqlx::PgPool;

use coachkit_core::types::{DbId, Timestamp};

use crate::models::security_event::{
    BucketCount, CreateSecurityEvent, IpActivity, SecurityEvent, SecurityEventQuery, UserActivity,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `security_events` SELECT queries.
const COLUMNS: &str = "\
    id, event_type, severity, user_id, api_key_id, source_ip, \
    user_agent, endpoint, http_method, details, risk_score, \
    resolved, resolved_by, resolved_at, resolution_notes, created_at";

/// Column list for INSERT (excludes auto-generated `id`, `created_at` and
/// the resolution fields, which start at their defaults).
const INSERT_COLUMNS: &str = "\
    event_type, severity, user_id, api_key_id, source_ip, \
    user_agent, endpoint, http_method, details, risk_score";

// ---------------------------------------------------------------------------
// SecurityEventRepo
// ---------------------------------------------------------------------------

/// Provides insert, query, resolution, and aggregation operations for
/// security events.
pub struct SecurityEventRepo;

impl SecurityEventRepo {
    /// Insert a new security event with its pre-computed risk score.
    ///
    /// `created_at` is assigned server-side by the database.
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateSecurityEvent,
        risk_score: i32,
    ) -> Result<SecurityEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO security_events ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SecurityEvent>(&query)
            .bind(&entry.event_type)
            .bind(&entry.severity)
            .bind(entry.user_id)
            .bind(entry.api_key_id)
            .bind(&entry.source_ip)
            .bind(&entry.user_agent)
            .bind(&entry.endpoint)
            .bind(&entry.http_method)
            .bind(&entry.details)
            .bind(risk_score)
            .fetch_one(pool)
            .await
    }

    /// Find a single event by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SecurityEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM security_events WHERE id = $1");
        sqlx::query_as::<_, SecurityEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Query security events with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &SecurityEventQuery,
    ) -> Result<Vec<SecurityEvent>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).min(500);
        let offset = params.offset.unwrap_or(0);

        let (where_clause, bind_values, bind_idx) = build_event_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM security_events {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_event_values(sqlx::query_as::<_, SecurityEvent>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count security events matching the given filter (for pagination).
    pub async fn count(pool: &PgPool, params: &SecurityEventQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_event_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM security_events {where_clause}");

        let q = bind_event_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Mark an event resolved. Returns `None` if the event does not exist or
    /// is already resolved (the caller distinguishes the two via
    /// [`Self::find_by_id`]).
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        resolved_by: DbId,
        notes: Option<&str>,
    ) -> Result<Option<SecurityEvent>, sqlx::Error> {
        let query = format!(
            "UPDATE security_events SET \
                 resolved = TRUE, resolved_by = $2, resolved_at = NOW(), \
                 resolution_notes = $3 \
             WHERE id = $1 AND resolved = FALSE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SecurityEvent>(&query)
            .bind(id)
            .bind(resolved_by)
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Window aggregations (reporting)
    // -----------------------------------------------------------------------

    /// Total number of events since `since`.
    pub async fn count_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM security_events WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Event counts grouped by severity since `since`.
    ///
    /// Only severities actually present appear; the reporting layer fills in
    /// the zero buckets.
    pub async fn severity_counts(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<BucketCount>, sqlx::Error> {
        sqlx::query_as::<_, BucketCount>(
            "SELECT severity AS bucket, COUNT(*)::BIGINT AS count \
             FROM security_events WHERE created_at >= $1 \
             GROUP BY severity ORDER BY bucket",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Event counts grouped by event type since `since`.
    pub async fn event_type_counts(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<BucketCount>, sqlx::Error> {
        sqlx::query_as::<_, BucketCount>(
            "SELECT event_type AS bucket, COUNT(*)::BIGINT AS count \
             FROM security_events WHERE created_at >= $1 \
             GROUP BY event_type ORDER BY bucket",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    /// Arithmetic mean of `risk_score` since `since`; 0.0 for an empty set.
    pub async fn average_risk_score(pool: &PgPool, since: Timestamp) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(AVG(risk_score), 0)::FLOAT8 \
             FROM security_events WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(pool)
        .await
    }

    /// Most active source IPs since `since`, busiest first.
    ///
    /// Ties break on the IP string so repeated calls over unchanged data
    /// return identical orderings.
    pub async fn top_source_ips(
        pool: &PgPool,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<IpActivity>, sqlx::Error> {
        sqlx::query_as::<_, IpActivity>(
            "SELECT source_ip, COUNT(*)::BIGINT AS count, \
                    AVG(risk_score)::FLOAT8 AS average_risk_score \
             FROM security_events WHERE created_at >= $1 \
             GROUP BY source_ip \
             ORDER BY count DESC, source_ip ASC \
             LIMIT $2",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Most active user actors since `since`, busiest first. Anonymous
    /// events (no user) are excluded.
    pub async fn top_users(
        pool: &PgPool,
        since: Timestamp,
        limit: i64,
    ) -> Result<Vec<UserActivity>, sqlx::Error> {
        sqlx::query_as::<_, UserActivity>(
            "SELECT user_id, COUNT(*)::BIGINT AS count, \
                    AVG(risk_score)::FLOAT8 AS average_risk_score \
             FROM security_events \
             WHERE created_at >= $1 AND user_id IS NOT NULL \
             GROUP BY user_id \
             ORDER BY count DESC, user_id ASC \
             LIMIT $2",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built security event queries.
enum BindValue {
    BigInt(i64),
    Bool(bool),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `SecurityEventQuery` filters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
/// The `where_clause` is empty if no filters are active, or starts with `WHERE `.
fn build_event_filter(params: &SecurityEventQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref event_type) = params.event_type {
        conditions.push(format!("event_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(event_type.clone()));
    }

    if let Some(ref severity) = params.severity {
        conditions.push(format!("severity = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(severity.clone()));
    }

    if let Some(resolved) = params.resolved {
        conditions.push(format!("resolved = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Bool(resolved));
    }

    if let Some(user_id) = params.user_id {
        conditions.push(format!("user_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(user_id));
    }

    if let Some(api_key_id) = params.api_key_id {
        conditions.push(format!("api_key_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(api_key_id));
    }

    if let Some(from) = params.from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_event_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_event_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
