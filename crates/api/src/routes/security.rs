//! Route definitions for the security event log and reports.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::security;
use crate::state::AppState;

/// Security routes mounted at `/admin/security`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /events                 -> list_events
/// POST /events/{id}/resolve    -> resolve_event
/// GET  /report                 -> report
/// GET  /overview               -> overview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(security::list_events))
        .route("/events/{id}/resolve", post(security::resolve_event))
        .route("/report", get(security::report))
        .route("/overview", get(security::overview))
}
