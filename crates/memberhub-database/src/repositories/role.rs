//! Role assignment repository implementation.

use sqlx::PgPool;

use memberhub_core::MemberId;
use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::result::AppResult;
use memberhub_entity::role::{Role, RoleAssignment};

/// Repository for the `member_roles` relation.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a member holds a role.
    pub async fn has_role(&self, member_id: MemberId, role: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM member_roles WHERE member_id = $1 AND role_id = $2)",
        )
        .bind(member_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check role", e))
    }

    /// List a member's role assignments, oldest first.
    pub async fn find_by_member(&self, member_id: MemberId) -> AppResult<Vec<RoleAssignment>> {
        sqlx::query_as::<_, RoleAssignment>(
            "SELECT member_id, role_id, granted_by, granted_at FROM member_roles \
             WHERE member_id = $1 ORDER BY granted_at ASC",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))
    }

    /// Grant a role. Granting a role the member already holds is a no-op.
    pub async fn grant(
        &self,
        member_id: MemberId,
        role: &Role,
        granted_by: Option<MemberId>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO member_roles (member_id, role_id, granted_by, granted_at) \
             VALUES ($1, $2, $3, NOW()) ON CONFLICT (member_id, role_id) DO NOTHING",
        )
        .bind(member_id)
        .bind(role.as_str())
        .bind(granted_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant role", e))?;
        Ok(())
    }

    /// Revoke a role. Returns `true` if an assignment was removed.
    pub async fn revoke(&self, member_id: MemberId, role: &Role) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM member_roles WHERE member_id = $1 AND role_id = $2")
            .bind(member_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke role", e))?;
        Ok(result.rows_affected() > 0)
    }
}
