//! Route definitions for the API-key authenticated external surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::external;
use crate::state::AppState;

/// External integration routes mounted at `/external`.
///
/// All routes require a valid `X-API-Key` (enforced by handler extractors,
/// which also record denial events for rejected keys).
///
/// ```text
/// GET  /whoami    -> whoami
/// POST /events    -> submit_event
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/whoami", get(external::whoami))
        .route("/events", post(external::submit_event))
}
