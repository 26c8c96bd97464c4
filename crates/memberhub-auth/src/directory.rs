//! Member directory and role assignment collaborators.
//!
//! The RBAC evaluator and the credential extractors only read identity data
//! through these traits. The sqlx repositories implement them for
//! production, and [`crate::memory`] implements them for tests.

use async_trait::async_trait;

use memberhub_core::{AppResult, MemberId};
use memberhub_database::repositories::{MemberRepository, RoleRepository};
use memberhub_entity::member::{Member, MemberInfo};
use memberhub_entity::role::{Role, RoleAssignment};

/// Lookup of member identity records.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Find a member by numeric ID.
    async fn find_by_id(&self, id: MemberId) -> AppResult<Option<MemberInfo>>;

    /// Find a member by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<MemberInfo>>;

    /// Load the full profile of a member.
    async fn find_profile(&self, id: MemberId) -> AppResult<Option<Member>>;
}

/// The member-to-role assignment relation.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Check whether a member holds a role.
    async fn has_role(&self, member_id: MemberId, role: &str) -> AppResult<bool>;

    /// List a member's role assignments.
    async fn roles_for(&self, member_id: MemberId) -> AppResult<Vec<RoleAssignment>>;

    /// Assign a role. Idempotent.
    async fn grant(
        &self,
        member_id: MemberId,
        role: &Role,
        granted_by: Option<MemberId>,
    ) -> AppResult<()>;

    /// Remove a role. Returns `true` if an assignment existed.
    async fn revoke(&self, member_id: MemberId, role: &Role) -> AppResult<bool>;

    /// Check whether a member holds the `ADMIN` role.
    async fn is_admin(&self, member_id: MemberId) -> AppResult<bool> {
        self.has_role(member_id, Role::ADMIN).await
    }
}

#[async_trait]
impl MemberDirectory for MemberRepository {
    async fn find_by_id(&self, id: MemberId) -> AppResult<Option<MemberInfo>> {
        self.find_info_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<MemberInfo>> {
        self.find_info_by_email(email).await
    }

    async fn find_profile(&self, id: MemberId) -> AppResult<Option<Member>> {
        MemberRepository::find_by_id(self, id).await
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn has_role(&self, member_id: MemberId, role: &str) -> AppResult<bool> {
        RoleRepository::has_role(self, member_id, role).await
    }

    async fn roles_for(&self, member_id: MemberId) -> AppResult<Vec<RoleAssignment>> {
        self.find_by_member(member_id).await
    }

    async fn grant(
        &self,
        member_id: MemberId,
        role: &Role,
        granted_by: Option<MemberId>,
    ) -> AppResult<()> {
        RoleRepository::grant(self, member_id, role, granted_by).await
    }

    async fn revoke(&self, member_id: MemberId, role: &Role) -> AppResult<bool> {
        RoleRepository::revoke(self, member_id, role).await
    }
}
