//! Report window parsing for the security reporting endpoints.

use chrono::Duration;

/// Default lookback window applied when the token is missing or unrecognized.
pub const DEFAULT_WINDOW: &str = "24h";

/// Supported window tokens, for documentation and API responses.
pub const SUPPORTED_WINDOWS: &[&str] = &["1h", "24h", "7d", "30d"];

/// Resolve a window token to a lookback duration.
///
/// Unrecognized tokens silently default to 24 hours; the reporting layer
/// never rejects its own inputs.
pub fn window_duration(token: &str) -> Duration {
    match token {
        "1h" => Duration::hours(1),
        "7d" => Duration::days(7),
        "30d" => Duration::days(30),
        _ => Duration::hours(24),
    }
}

/// Echo the effective window token for a raw input, so report payloads can
/// state which window was actually applied.
pub fn effective_window(token: &str) -> &'static str {
    match token {
        "1h" => "1h",
        "7d" => "7d",
        "30d" => "30d",
        _ => DEFAULT_WINDOW,
    }
}
