//! Repository for the `api_keys` table.
//!
//! Key rows are never deleted. Revocation flips `is_active` and stamps
//! `revoked_at`; expiry is time-based and checked at authorization time.

use sqlx::PgPool;

use coachkit_core::types::{DbId, Timestamp};

use crate::models::api_key::ApiKey;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, name, key_hash, key_prefix, owner_id, permissions, \
    endpoint_allow_list, ip_allow_list, is_active, expires_at, \
    last_used_at, revoked_at, rate_limit_requests, rate_limit_window_ms, \
    created_at, updated_at";

/// Provides CRUD operations for API key credentials.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// Create a new API key. Returns the full row (with hash).
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        name: &str,
        key_hash: &str,
        key_prefix: &str,
        owner_id: DbId,
        permissions: &[String],
        endpoint_allow_list: &[String],
        ip_allow_list: &[String],
        expires_at: Option<Timestamp>,
        rate_limit_requests: i32,
        rate_limit_window_ms: i64,
    ) -> Result<ApiKey, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_keys \
                 (name, key_hash, key_prefix, owner_id, permissions, \
                  endpoint_allow_list, ip_allow_list, expires_at, \
                  rate_limit_requests, rate_limit_window_ms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(name)
            .bind(key_hash)
            .bind(key_prefix)
            .bind(owner_id)
            .bind(permissions)
            .bind(endpoint_allow_list)
            .bind(ip_allow_list)
            .bind(expires_at)
            .bind(rate_limit_requests)
            .bind(rate_limit_window_ms)
            .fetch_one(pool)
            .await
    }

    /// List all API keys, newest first. The hash column is selected but the
    /// model never serializes it.
    pub async fn list(pool: &PgPool) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, ApiKey>(&query).fetch_all(pool).await
    }

    /// Find an API key by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE id = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an API key by the SHA-256 hash of the presented plaintext.
    ///
    /// Used during authorization. Activity, expiry, and allow-list checks are
    /// the gate's responsibility; this is a pure lookup.
    pub async fn find_by_hash(pool: &PgPool, key_hash: &str) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys WHERE key_hash = $1");
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke an API key: set `revoked_at` and deactivate it.
    ///
    /// Returns `None` if the key does not exist or was already revoked.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "UPDATE api_keys SET revoked_at = NOW(), is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND revoked_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update `last_used_at` to the current timestamp.
    ///
    /// Best-effort bookkeeping: concurrent requests with the same credential
    /// may race on this field with no correctness impact.
    pub async fn touch_last_used(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
