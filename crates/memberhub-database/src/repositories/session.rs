//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use memberhub_core::MemberId;
use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::result::AppResult;
use memberhub_entity::session::{NewSession, SessionWithMember};

/// Repository for session persistence. Every operation is a single-row
/// or single-statement write.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session.
    pub async fn create(&self, data: &NewSession) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, member_id, created_at, expires_at, last_activity, user_agent, ip_address) \
             VALUES ($1, $2, $3, $4, $3, $5, $6)",
        )
        .bind(&data.id)
        .bind(data.member_id)
        .bind(data.created_at)
        .bind(data.expires_at)
        .bind(&data.user_agent)
        .bind(&data.ip_address)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))?;
        Ok(())
    }

    /// Find an unexpired session joined with its member's email and name.
    pub async fn find_active(&self, id: &str) -> AppResult<Option<SessionWithMember>> {
        sqlx::query_as::<_, SessionWithMember>(
            "SELECT s.id, s.member_id, s.created_at, s.expires_at, s.last_activity, \
                    s.user_agent, s.ip_address, m.email, m.full_name \
             FROM sessions s JOIN members m ON m.id = s.member_id \
             WHERE s.id = $1 AND s.expires_at > NOW()",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    /// Set `last_activity` to now.
    pub async fn update_activity(&self, id: &str) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET last_activity = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update session activity", e)
            })?;
        Ok(())
    }

    /// Move the expiry of a session.
    pub async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET expires_at = $2 WHERE id = $1")
            .bind(id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to extend session", e))?;
        Ok(())
    }

    /// Delete a session. Returns `true` if a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete session", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a member. Returns the number removed.
    pub async fn delete_by_member(&self, member_id: MemberId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete member sessions", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Delete sessions whose expiry has passed. Returns the number removed.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}
