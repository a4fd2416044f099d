//! Security event vocabulary and the risk scorer.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and any future worker or CLI tooling.

// ---------------------------------------------------------------------------
// Event type constants
// ---------------------------------------------------------------------------

/// Known event types for security event records.
///
/// The set is open: callers may record event types not listed here, which
/// simply contribute zero base points to the risk score.
pub mod event_types {
    pub const LOGIN_ATTEMPT: &str = "login_attempt";
    pub const LOGIN_FAILED: &str = "login_failed";
    pub const ACCOUNT_LOCKED: &str = "account_locked";
    pub const PERMISSION_DENIED: &str = "permission_denied";
    pub const SUSPICIOUS_ACTIVITY: &str = "suspicious_activity";
    pub const RATE_LIMIT_EXCEEDED: &str = "rate_limit_exceeded";
    pub const API_KEY_CREATED: &str = "api_key_created";
    pub const API_KEY_REVOKED: &str = "api_key_revoked";
    pub const API_KEY_USED: &str = "api_key_used";
    pub const API_KEY_INVALID: &str = "api_key_invalid";
    pub const API_KEY_EXPIRED: &str = "api_key_expired";
    pub const PASSWORD_RESET: &str = "password_reset";
    pub const FILE_UPLOAD: &str = "file_upload";
    pub const FILE_DOWNLOAD: &str = "file_download";
    pub const DATA_ACCESS: &str = "data_access";
    pub const DATA_MODIFICATION: &str = "data_modification";
}

// ---------------------------------------------------------------------------
// Severity constants
// ---------------------------------------------------------------------------

/// Caller-assigned severity buckets, independent of (but contributing to)
/// the risk score.
pub mod severities {
    pub const LOW: &str = "low";
    pub const MEDIUM: &str = "medium";
    pub const HIGH: &str = "high";
    pub const CRITICAL: &str = "critical";
}

/// All severity buckets in ascending order. Report summaries emit every
/// bucket even when its count is zero.
pub const ALL_SEVERITIES: &[&str] = &[
    severities::LOW,
    severities::MEDIUM,
    severities::HIGH,
    severities::CRITICAL,
];

/// Normalize a caller-supplied severity string.
///
/// Anything outside the known bucket set collapses to `low`, matching the
/// "absent severity defaults to its zero contribution" contract.
pub fn normalize_severity(severity: &str) -> &'static str {
    match severity {
        severities::MEDIUM => severities::MEDIUM,
        severities::HIGH => severities::HIGH,
        severities::CRITICAL => severities::CRITICAL,
        _ => severities::LOW,
    }
}

// ---------------------------------------------------------------------------
// Risk scorer
// ---------------------------------------------------------------------------

/// Maximum risk score. The scorer clamps to `[0, MAX_RISK_SCORE]`.
pub const MAX_RISK_SCORE: i32 = 100;

/// Fixed increment applied when the event carries a source IP.
///
/// Preserved from the original scoring table for compatibility. IP presence
/// marks an event as attributable rather than more dangerous, so this is a
/// modeling artifact, not a real risk signal.
const HAS_IP_POINTS: i32 = 5;

/// Additional points for `high` severity.
const HIGH_SEVERITY_POINTS: i32 = 20;

/// Additional points for `critical` severity.
const CRITICAL_SEVERITY_POINTS: i32 = 40;

/// Base point value for an event type. Types not in the table contribute 0.
fn base_points(event_type: &str) -> i32 {
    match event_type {
        event_types::LOGIN_ATTEMPT => 5,
        event_types::LOGIN_FAILED => 15,
        event_types::ACCOUNT_LOCKED => 25,
        event_types::PERMISSION_DENIED => 20,
        event_types::SUSPICIOUS_ACTIVITY => 30,
        event_types::RATE_LIMIT_EXCEEDED => 35,
        event_types::API_KEY_REVOKED => 10,
        event_types::PASSWORD_RESET => 15,
        _ => 0,
    }
}

/// Compute the risk score for a single event.
///
/// A stateless, deterministic point sum: base points per event type, +5 when
/// a source IP is present, +20 for `high` severity, +40 for `critical`,
/// clamped to `[0, 100]`. Unknown event types and severities contribute
/// nothing; the function is total and never panics.
///
/// Scores are computed once at record-creation time and never recomputed.
pub fn risk_score(event_type: &str, severity: &str, has_source_ip: bool) -> i32 {
    let mut score = base_points(event_type);

    if has_source_ip {
        score += HAS_IP_POINTS;
    }

    score += match normalize_severity(severity) {
        severities::HIGH => HIGH_SEVERITY_POINTS,
        severities::CRITICAL => CRITICAL_SEVERITY_POINTS,
        _ => 0,
    };

    score.clamp(0, MAX_RISK_SCORE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_EVENTS: &[&str] = &[
        event_types::LOGIN_ATTEMPT,
        event_types::LOGIN_FAILED,
        event_types::ACCOUNT_LOCKED,
        event_types::PERMISSION_DENIED,
        event_types::SUSPICIOUS_ACTIVITY,
        event_types::RATE_LIMIT_EXCEEDED,
        event_types::API_KEY_CREATED,
        event_types::API_KEY_REVOKED,
        event_types::API_KEY_USED,
        event_types::API_KEY_INVALID,
        event_types::API_KEY_EXPIRED,
        event_types::PASSWORD_RESET,
        event_types::FILE_UPLOAD,
        event_types::FILE_DOWNLOAD,
        event_types::DATA_ACCESS,
        event_types::DATA_MODIFICATION,
    ];

    // -- Range and determinism ---------------------------------------------

    #[test]
    fn score_is_always_in_range() {
        for event in KNOWN_EVENTS {
            for severity in ALL_SEVERITIES {
                for has_ip in [false, true] {
                    let score = risk_score(event, severity, has_ip);
                    assert!((0..=100).contains(&score), "{event}/{severity}: {score}");
                }
            }
        }
    }

    #[test]
    fn score_is_deterministic() {
        for event in KNOWN_EVENTS {
            for severity in ALL_SEVERITIES {
                let a = risk_score(event, severity, true);
                let b = risk_score(event, severity, true);
                assert_eq!(a, b);
            }
        }
    }

    // -- Monotonicity -------------------------------------------------------

    #[test]
    fn ip_presence_never_lowers_score() {
        for event in KNOWN_EVENTS {
            for severity in ALL_SEVERITIES {
                assert!(
                    risk_score(event, severity, true) >= risk_score(event, severity, false),
                    "{event}/{severity}",
                );
            }
        }
    }

    #[test]
    fn severity_is_monotone() {
        for event in KNOWN_EVENTS {
            for has_ip in [false, true] {
                let low = risk_score(event, severities::LOW, has_ip);
                let high = risk_score(event, severities::HIGH, has_ip);
                let critical = risk_score(event, severities::CRITICAL, has_ip);
                assert!(critical >= high, "{event}");
                assert!(high >= low, "{event}");
            }
        }
    }

    // -- Known point values -------------------------------------------------

    #[test]
    fn failed_login_with_ip_scores_twenty() {
        // 15 base + 5 for the source IP; medium severity adds nothing.
        let score = risk_score(event_types::LOGIN_FAILED, severities::MEDIUM, true);
        assert_eq!(score, 20);
    }

    #[test]
    fn critical_rate_limit_with_ip_scores_eighty() {
        // 35 base + 5 IP + 40 critical = 80.
        let score = risk_score(event_types::RATE_LIMIT_EXCEEDED, severities::CRITICAL, true);
        assert_eq!(score, 80);
    }

    #[test]
    fn unknown_event_contributes_zero_base() {
        assert_eq!(risk_score("something_new", severities::LOW, false), 0);
        assert_eq!(risk_score("something_new", severities::LOW, true), 5);
    }

    #[test]
    fn unknown_severity_treated_as_low() {
        let score = risk_score(event_types::LOGIN_FAILED, "catastrophic", false);
        assert_eq!(score, 15);
    }

    #[test]
    fn severity_points_are_additive_with_base() {
        assert_eq!(
            risk_score(event_types::SUSPICIOUS_ACTIVITY, severities::HIGH, false),
            50,
        );
        assert_eq!(
            risk_score(event_types::SUSPICIOUS_ACTIVITY, severities::CRITICAL, true),
            75,
        );
    }

    // -- Normalization ------------------------------------------------------

    #[test]
    fn normalize_preserves_known_buckets() {
        for severity in ALL_SEVERITIES {
            assert_eq!(normalize_severity(severity), *severity);
        }
    }

    #[test]
    fn normalize_collapses_unknown_to_low() {
        assert_eq!(normalize_severity(""), severities::LOW);
        assert_eq!(normalize_severity("HIGH"), severities::LOW);
        assert_eq!(normalize_severity("urgent"), severities::LOW);
    }
}
