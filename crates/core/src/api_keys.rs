//! API key generation, hashing, and permission vocabulary.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and any future worker or CLI tooling.

use rand::Rng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the generated API key string (alphanumeric characters).
pub const KEY_LENGTH: usize = 48;

/// Number of leading characters stored as a human-visible prefix.
pub const KEY_PREFIX_LENGTH: usize = 8;

/// Default advisory quota: requests per window.
pub const DEFAULT_RATE_LIMIT_REQUESTS: i32 = 100;

/// Default advisory quota window in milliseconds (15 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: i64 = 15 * 60 * 1000;

// ---------------------------------------------------------------------------
// Permission constants
// ---------------------------------------------------------------------------

/// Known API key permission names.
pub mod permissions {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const ADMIN: &str = "admin";
}

/// All valid permission names, used when validating create requests.
pub const ALL_PERMISSIONS: &[&str] = &[
    permissions::READ,
    permissions::WRITE,
    permissions::ADMIN,
];

/// Whether `name` is a recognized permission.
pub fn is_valid_permission(name: &str) -> bool {
    ALL_PERMISSIONS.contains(&name)
}

// ---------------------------------------------------------------------------
// API key generation
// ---------------------------------------------------------------------------

/// The result of generating a new API key.
pub struct GeneratedApiKey {
    /// The plaintext key (shown to the caller exactly once, never stored).
    pub plaintext: String,
    /// The first [`KEY_PREFIX_LENGTH`] characters of the key for display.
    pub prefix: String,
    /// The SHA-256 hex digest of the plaintext key (stored in the database).
    pub hash: String,
}

/// Generate a new random API key.
///
/// Returns the plaintext (shown once), prefix (for identification), and
/// SHA-256 hash (for storage). The plaintext must never be persisted.
pub fn generate_api_key() -> GeneratedApiKey {
    let key: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_LENGTH)
        .map(char::from)
        .collect();

    let prefix = key[..KEY_PREFIX_LENGTH].to_string();
    let hash = hash_api_key(&key);

    GeneratedApiKey {
        plaintext: key,
        prefix,
        hash,
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Compute the SHA-256 hex digest of an API key.
///
/// Used both during key creation (to store the hash) and during
/// authorization (to look up the presented key by hash).
pub fn hash_api_key(key: &str) -> String {
    crate::hashing::sha256_hex(key.as_bytes())
}

/// Extract the prefix from a plaintext API key.
pub fn extract_prefix(key: &str) -> &str {
    &key[..KEY_PREFIX_LENGTH.min(key.len())]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
