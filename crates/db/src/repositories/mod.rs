//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod api_key_repo;
pub mod security_event_repo;

pub use api_key_repo::ApiKeyRepo;
pub use security_event_repo::SecurityEventRepo;
