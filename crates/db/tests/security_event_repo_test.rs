//! Repository-level tests for security event aggregation and resolution.

use sqlx::PgPool;

use coachkit_db::models::security_event::{CreateSecurityEvent, SecurityEventQuery};
use coachkit_db::repositories::SecurityEventRepo;

fn entry(event_type: &str, severity: &str, source_ip: &str, user_id: Option<i64>) -> CreateSecurityEvent {
    CreateSecurityEvent {
        event_type: event_type.to_string(),
        severity: severity.to_string(),
        user_id,
        api_key_id: None,
        source_ip: source_ip.to_string(),
        user_agent: None,
        endpoint: None,
        http_method: None,
        details: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn insert_returns_full_row(pool: PgPool) {
    let event = SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.1", Some(2)), 20)
        .await
        .expect("insert should succeed");

    assert_eq!(event.event_type, "login_failed");
    assert_eq!(event.risk_score, 20);
    assert!(!event.resolved);
    assert!(event.resolved_by.is_none());

    let found = SecurityEventRepo::find_by_id(&pool, event.id)
        .await
        .expect("lookup should succeed")
        .expect("event should exist");
    assert_eq!(found.id, event.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn resolve_is_one_shot(pool: PgPool) {
    let event = SecurityEventRepo::insert(&pool, &entry("account_locked", "medium", "10.0.0.1", None), 25)
        .await
        .expect("insert should succeed");

    let resolved = SecurityEventRepo::resolve(&pool, event.id, 1, Some("reviewed"))
        .await
        .expect("resolve should succeed")
        .expect("first resolve should return the row");
    assert!(resolved.resolved);
    assert_eq!(resolved.resolved_by, Some(1));
    assert_eq!(resolved.resolution_notes.as_deref(), Some("reviewed"));
    assert!(resolved.resolved_at.is_some());

    // Second resolution is a no-op returning None.
    let again = SecurityEventRepo::resolve(&pool, event.id, 2, Some("again"))
        .await
        .expect("resolve should succeed");
    assert!(again.is_none());

    // The first resolution is untouched.
    let found = SecurityEventRepo::find_by_id(&pool, event.id)
        .await
        .expect("lookup should succeed")
        .expect("event should exist");
    assert_eq!(found.resolved_by, Some(1));
    assert_eq!(found.resolution_notes.as_deref(), Some("reviewed"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn query_filters_compose(pool: PgPool) {
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.1", Some(1)), 20)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("login_failed", "high", "10.0.0.2", Some(2)), 40)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("password_reset", "low", "10.0.0.1", Some(1)), 20)
        .await
        .expect("insert should succeed");

    let query = SecurityEventQuery {
        event_type: Some("login_failed".to_string()),
        user_id: Some(1),
        ..Default::default()
    };
    let items = SecurityEventRepo::query(&pool, &query)
        .await
        .expect("query should succeed");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].severity, "low");

    let total = SecurityEventRepo::count(&pool, &query)
        .await
        .expect("count should succeed");
    assert_eq!(total, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn aggregates_on_empty_window(pool: PgPool) {
    let since = chrono::Utc::now() - chrono::Duration::hours(24);

    assert_eq!(
        SecurityEventRepo::count_since(&pool, since)
            .await
            .expect("count should succeed"),
        0
    );
    assert_eq!(
        SecurityEventRepo::average_risk_score(&pool, since)
            .await
            .expect("average should succeed"),
        0.0
    );
    assert!(SecurityEventRepo::severity_counts(&pool, since)
        .await
        .expect("severity counts should succeed")
        .is_empty());
    assert!(SecurityEventRepo::top_source_ips(&pool, since, 10)
        .await
        .expect("top ips should succeed")
        .is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_source_ips_orders_by_count_then_ip(pool: PgPool) {
    let since = chrono::Utc::now() - chrono::Duration::hours(1);

    // Two IPs with one event each, one IP with two.
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.5", None), 20)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.5", None), 40)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.9", None), 20)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.2", None), 20)
        .await
        .expect("insert should succeed");

    let top = SecurityEventRepo::top_source_ips(&pool, since, 10)
        .await
        .expect("top ips should succeed");

    assert_eq!(top.len(), 3);
    assert_eq!(top[0].source_ip, "10.0.0.5");
    assert_eq!(top[0].count, 2);
    assert_eq!(top[0].average_risk_score, 30.0);
    // Tie between the single-event IPs breaks on the IP string.
    assert_eq!(top[1].source_ip, "10.0.0.2");
    assert_eq!(top[2].source_ip, "10.0.0.9");

    // The limit is honored.
    let top = SecurityEventRepo::top_source_ips(&pool, since, 1)
        .await
        .expect("top ips should succeed");
    assert_eq!(top.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_users_excludes_anonymous_events(pool: PgPool) {
    let since = chrono::Utc::now() - chrono::Duration::hours(1);

    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.1", Some(3)), 20)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.1", None), 20)
        .await
        .expect("insert should succeed");

    let top = SecurityEventRepo::top_users(&pool, since, 10)
        .await
        .expect("top users should succeed");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].user_id, 3);
    assert_eq!(top[0].count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn severity_and_type_buckets_count_rows(pool: PgPool) {
    let since = chrono::Utc::now() - chrono::Duration::hours(1);

    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.1", None), 20)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("login_failed", "low", "10.0.0.1", None), 20)
        .await
        .expect("insert should succeed");
    SecurityEventRepo::insert(&pool, &entry("account_locked", "high", "10.0.0.1", None), 50)
        .await
        .expect("insert should succeed");

    let severities = SecurityEventRepo::severity_counts(&pool, since)
        .await
        .expect("severity counts should succeed");
    assert_eq!(severities.len(), 2);
    // Buckets come back ordered by name.
    assert_eq!(severities[0].bucket, "high");
    assert_eq!(severities[0].count, 1);
    assert_eq!(severities[1].bucket, "low");
    assert_eq!(severities[1].count, 2);

    let types = SecurityEventRepo::event_type_counts(&pool, since)
        .await
        .expect("type counts should succeed");
    assert_eq!(types.len(), 2);
    assert_eq!(types[0].bucket, "account_locked");
    assert_eq!(types[1].bucket, "login_failed");
    assert_eq!(types[1].count, 2);
}
