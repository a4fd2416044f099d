//! Request metadata extraction shared by the API-key gate and handlers that
//! record security events.

use axum::http::HeaderMap;

/// Best-effort source IP of the request.
///
/// Takes the first hop of `X-Forwarded-For`, then `X-Real-IP`. Returns an
/// empty string when neither header is present; the risk scorer treats an
/// empty IP as "no source IP".
pub fn source_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// The request's `User-Agent` header, if present.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
