//! API key repository implementation.

use sqlx::PgPool;

use memberhub_core::ApiKeyId;
use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::result::AppResult;
use memberhub_entity::api_key::{ApiKey, KeyType, NewApiKey};

/// Repository for stored API key hashes.
#[derive(Debug, Clone)]
pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    /// Create a new API key repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a newly issued key.
    pub async fn create(&self, data: &NewApiKey) -> AppResult<ApiKey> {
        sqlx::query_as::<_, ApiKey>(
            "INSERT INTO api_keys (member_email, api_key_hash, project, allowed_origin, is_dev, is_admin, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7) RETURNING *",
        )
        .bind(&data.member_email)
        .bind(&data.api_key_hash)
        .bind(&data.project)
        .bind(&data.allowed_origin)
        .bind(data.key_type == KeyType::Dev)
        .bind(data.key_type == KeyType::Admin)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store API key", e))
    }

    /// Check whether any key is already bound to `origin`.
    pub async fn origin_exists(&self, origin: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM api_keys WHERE allowed_origin = $1)",
        )
        .bind(origin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check allowed origin", e)
        })
    }

    /// List keys owned by a member email, newest first.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Vec<ApiKey>> {
        sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE member_email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list API keys", e))
    }

    /// Delete a key owned by `email`. Returns `true` if a row was removed.
    pub async fn delete_owned(&self, id: ApiKeyId, email: &str) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM api_keys WHERE api_key_id = $1 AND member_email = $2")
                .bind(id)
                .bind(email)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to revoke API key", e)
                })?;
        Ok(result.rows_affected() > 0)
    }
}
