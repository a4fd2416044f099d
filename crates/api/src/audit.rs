//! The security audit logger.
//!
//! Call sites (the API-key gate, key management handlers, the external event
//! intake) describe what happened; this module scores the event, persists it,
//! and escalates high/critical events to the operational log.
//!
//! The core failure contract: a persistence failure here must never break the
//! business action that triggered the event. A failed login is still a failed
//! login even when the audit write fails.

use coachkit_core::security::{self, severities};
use coachkit_db::models::security_event::{CreateSecurityEvent, SecurityEvent};
use coachkit_db::repositories::SecurityEventRepo;
use coachkit_db::DbPool;

/// Score and persist a security event.
///
/// The severity is normalized (unknown values collapse to `low`) and the risk
/// score is computed once, here, from the event type, severity, and source-IP
/// presence. High and critical events additionally emit a `tracing::warn!`
/// line as a side channel for real-time alerting, independent of the
/// persisted record.
///
/// Returns `None` when the write fails; the error is logged operationally and
/// intentionally not propagated.
pub async fn record_event(pool: &DbPool, mut input: CreateSecurityEvent) -> Option<SecurityEvent> {
    input.severity = security::normalize_severity(&input.severity).to_string();

    let risk_score =
        security::risk_score(&input.event_type, &input.severity, !input.source_ip.is_empty());

    if input.severity == severities::HIGH || input.severity == severities::CRITICAL {
        tracing::warn!(
            event_type = %input.event_type,
            severity = %input.severity,
            user_id = input.user_id,
            api_key_id = input.api_key_id,
            source_ip = %input.source_ip,
            endpoint = input.endpoint.as_deref(),
            risk_score,
            "High-severity security event",
        );
    }

    match SecurityEventRepo::insert(pool, &input, risk_score).await {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::error!(
                error = %err,
                event_type = %input.event_type,
                severity = %input.severity,
                "Failed to persist security event",
            );
            None
        }
    }
}
