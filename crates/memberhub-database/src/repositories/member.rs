//! Member repository implementation.

use sqlx::PgPool;

use memberhub_core::MemberId;
use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::result::AppResult;
use memberhub_entity::member::{Member, MemberInfo};

const INFO_COLUMNS: &str = "id, email, full_name, position_id, committee_id";

/// Read access to the member directory.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a full member record by ID.
    pub async fn find_by_id(&self, id: MemberId) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find member", e))
    }

    /// Find the identity subset of a member by ID.
    pub async fn find_info_by_id(&self, id: MemberId) -> AppResult<Option<MemberInfo>> {
        sqlx::query_as::<_, MemberInfo>(&format!(
            "SELECT {INFO_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find member", e))
    }

    /// Find the identity subset of a member by email (case-insensitive).
    pub async fn find_info_by_email(&self, email: &str) -> AppResult<Option<MemberInfo>> {
        sqlx::query_as::<_, MemberInfo>(&format!(
            "SELECT {INFO_COLUMNS} FROM members WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find member by email", e)
        })
    }
}
