//! Route definitions for API key management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::api_keys;
use crate::state::AppState;

/// API key management routes mounted at `/admin/api-keys`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /               -> list_api_keys
/// POST /               -> create_api_key
/// POST /{id}/revoke    -> revoke_api_key
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_keys::list_api_keys).post(api_keys::create_api_key))
        .route("/{id}/revoke", post(api_keys::revoke_api_key))
}
