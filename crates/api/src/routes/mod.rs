pub mod api_keys;
pub mod external;
pub mod health;
pub mod security;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/security/events                    query events (admin only)
/// /admin/security/events/{id}/resolve       resolve event (POST)
/// /admin/security/report                    window summary
/// /admin/security/overview                  summary + top IPs/users
///
/// /admin/api-keys                           list, create (admin only)
/// /admin/api-keys/{id}/revoke               revoke (POST)
///
/// /external/whoami                          key identity (read permission)
/// /external/events                          submit event (write permission)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Security event log and reporting (admin only).
        .nest("/admin/security", security::router())
        // API key management (admin only).
        .nest("/admin/api-keys", api_keys::router())
        // API-key-gated external API.
        .nest("/external", external::router())
}
