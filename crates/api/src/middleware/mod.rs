//! Request extractors for authentication and authorization.
//!
//! `auth` provides the JWT bearer-token extractor and admin gate for
//! management endpoints; `api_key` provides the API-key gate for the
//! external programmatic API.

pub mod api_key;
pub mod auth;
