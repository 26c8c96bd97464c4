//! RBAC evaluator over the member directory and role assignments.
//!
//! Every decision fails closed: a lookup error or a missing member is
//! logged and treated as a denial. Holding the `ADMIN` role bypasses every
//! position and committee check.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{error, info, warn};

use memberhub_core::{AppError, AppResult, MemberId};
use memberhub_entity::member::{EditableField, MemberInfo, Position};
use memberhub_entity::role::{Role, RoleAssignment};

use crate::directory::{MemberDirectory, RoleStore};

use super::hierarchy;

/// Committee whose members may always manage API keys.
pub const PRIVILEGED_COMMITTEE: &str = "RND";

/// Evaluates who may do what to whom.
#[derive(Clone)]
pub struct RbacService {
    members: Arc<dyn MemberDirectory>,
    roles: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for RbacService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbacService").finish()
    }
}

impl RbacService {
    /// Creates a new evaluator.
    pub fn new(members: Arc<dyn MemberDirectory>, roles: Arc<dyn RoleStore>) -> Self {
        Self { members, roles }
    }

    /// `true` iff the member holds the `ADMIN` role.
    pub async fn is_admin(&self, member_id: MemberId) -> bool {
        match self.roles.is_admin(member_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                error!(member_id = %member_id, error = %e, "Failed to check admin status");
                false
            }
        }
    }

    /// `true` iff the member holds `role`.
    pub async fn has_role(&self, member_id: MemberId, role: &str) -> bool {
        match self.roles.has_role(member_id, role).await {
            Ok(has) => has,
            Err(e) => {
                error!(member_id = %member_id, role = %role, error = %e, "Failed to check role");
                false
            }
        }
    }

    /// Whether `actor` may edit `target`'s profile.
    ///
    /// Self-edit and admins are always allowed. Otherwise the actor must
    /// strictly outrank the target, and must be `PRES`/`EVP`, or a `VP` in
    /// the target's committee.
    pub async fn can_edit_member(&self, actor: MemberId, target: MemberId) -> bool {
        if actor == target {
            return true;
        }
        if self.is_admin(actor).await {
            return true;
        }

        let Some(actor_info) = self.lookup(actor, "actor").await else {
            return false;
        };
        let Some(target_info) = self.lookup(target, "target").await else {
            return false;
        };

        let actor_position = actor_info.position();
        if !hierarchy::higher(actor_position, target_info.position()) {
            return false;
        }

        match actor_position.parse::<Position>() {
            Ok(Position::Pres | Position::Evp) => true,
            Ok(Position::Vp) => actor_info.committee() == target_info.committee(),
            _ => false,
        }
    }

    /// Whether `actor` may view `target`. Every authenticated member may
    /// view every profile.
    pub async fn can_view_member(&self, _actor: MemberId, _target: MemberId) -> bool {
        true
    }

    /// Whether `actor` may grant and revoke roles.
    pub async fn can_manage_roles(&self, actor: MemberId) -> bool {
        self.is_admin(actor).await
    }

    /// Whether the member may manage API keys: admins, members of the
    /// privileged committee, and anyone at `AVP` or above.
    pub async fn can_access_api_key_management(&self, member_id: MemberId) -> bool {
        if self.is_admin(member_id).await {
            return true;
        }
        match self.lookup(member_id, "member").await {
            Some(info) => api_key_eligible(&info),
            None => false,
        }
    }

    /// Email form of [`Self::can_access_api_key_management`]. Unknown
    /// emails are denied.
    pub async fn can_access_api_by_email(&self, email: &str) -> bool {
        let info = match self.members.find_by_email(email).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                warn!(email = %email, "API access check for non-member email");
                return false;
            }
            Err(e) => {
                error!(email = %email, error = %e, "Failed to look up member for API access check");
                return false;
            }
        };
        if self.is_admin(info.id).await {
            return true;
        }
        api_key_eligible(&info)
    }

    /// Whether `actor` may change `field` on `target`.
    pub async fn can_edit_field(
        &self,
        actor: MemberId,
        target: MemberId,
        field: EditableField,
    ) -> bool {
        if self.is_admin(actor).await {
            return true;
        }
        if actor == target {
            return field.is_self_editable();
        }
        if !self.can_edit_member(actor, target).await {
            return false;
        }
        field.is_self_editable() || field.is_authorized_editable()
    }

    /// The fields `actor` may change on `target`, in a stable order.
    pub async fn get_editable_fields(
        &self,
        actor: MemberId,
        target: MemberId,
    ) -> BTreeSet<EditableField> {
        if self.is_admin(actor).await {
            return EditableField::all().collect();
        }
        if actor == target {
            return EditableField::SELF_EDITABLE.iter().copied().collect();
        }
        if self.can_edit_member(actor, target).await {
            return EditableField::all().collect();
        }
        BTreeSet::new()
    }

    /// List a member's role assignments.
    pub async fn roles_for(&self, member_id: MemberId) -> AppResult<Vec<RoleAssignment>> {
        self.roles.roles_for(member_id).await
    }

    /// Grant `role` to `member` on behalf of `actor`.
    pub async fn grant_role(&self, actor: MemberId, member: MemberId, role: &Role) -> AppResult<()> {
        self.require_role_manager(actor).await?;
        self.require_member(member).await?;
        self.roles.grant(member, role, Some(actor)).await?;
        info!(actor_id = %actor, member_id = %member, role = %role, "Role granted");
        Ok(())
    }

    /// Revoke `role` from `member` on behalf of `actor`.
    pub async fn revoke_role(&self, actor: MemberId, member: MemberId, role: &Role) -> AppResult<()> {
        self.require_role_manager(actor).await?;
        if !self.roles.revoke(member, role).await? {
            return Err(AppError::not_found(format!(
                "Member {member} does not hold role {role}"
            )));
        }
        info!(actor_id = %actor, member_id = %member, role = %role, "Role revoked");
        Ok(())
    }

    async fn require_role_manager(&self, actor: MemberId) -> AppResult<()> {
        if self.can_manage_roles(actor).await {
            Ok(())
        } else {
            Err(AppError::forbidden("Only administrators can manage roles"))
        }
    }

    async fn require_member(&self, member: MemberId) -> AppResult<MemberInfo> {
        self.members
            .find_by_id(member)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Member {member} not found")))
    }

    async fn lookup(&self, id: MemberId, what: &'static str) -> Option<MemberInfo> {
        match self.members.find_by_id(id).await {
            Ok(Some(info)) => Some(info),
            Ok(None) => {
                warn!(member_id = %id, subject = what, "Member not found during authorization");
                None
            }
            Err(e) => {
                error!(member_id = %id, subject = what, error = %e, "Failed to look up member");
                None
            }
        }
    }
}

fn api_key_eligible(info: &MemberInfo) -> bool {
    info.committee() == PRIVILEGED_COMMITTEE
        || hierarchy::higher_or_equal(info.position(), Position::Avp.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::memory::{MemoryMemberDirectory, MemoryRoleStore};

    struct FailingDirectory;

    #[async_trait]
    impl MemberDirectory for FailingDirectory {
        async fn find_by_id(&self, _id: MemberId) -> AppResult<Option<MemberInfo>> {
            Err(AppError::database("connection refused"))
        }

        async fn find_by_email(&self, _email: &str) -> AppResult<Option<MemberInfo>> {
            Err(AppError::database("connection refused"))
        }

        async fn find_profile(
            &self,
            _id: MemberId,
        ) -> AppResult<Option<memberhub_entity::member::Member>> {
            Err(AppError::database("connection refused"))
        }
    }

    struct FailingRoles;

    #[async_trait]
    impl RoleStore for FailingRoles {
        async fn has_role(&self, _member_id: MemberId, _role: &str) -> AppResult<bool> {
            Err(AppError::database("connection refused"))
        }

        async fn roles_for(&self, _member_id: MemberId) -> AppResult<Vec<RoleAssignment>> {
            Err(AppError::database("connection refused"))
        }

        async fn grant(&self, _: MemberId, _: &Role, _: Option<MemberId>) -> AppResult<()> {
            Err(AppError::database("connection refused"))
        }

        async fn revoke(&self, _: MemberId, _: &Role) -> AppResult<bool> {
            Err(AppError::database("connection refused"))
        }
    }

    struct Fixture {
        rbac: RbacService,
        roles: Arc<MemoryRoleStore>,
    }

    fn info(id: i32, position: &str, committee: &str) -> MemberInfo {
        MemberInfo {
            id: MemberId::from(id),
            email: format!("m{id}@example.org"),
            full_name: format!("Member {id}"),
            position_id: (!position.is_empty()).then(|| position.to_string()),
            committee_id: (!committee.is_empty()).then(|| committee.to_string()),
        }
    }

    async fn fixture(members: &[MemberInfo]) -> Fixture {
        let directory = Arc::new(MemoryMemberDirectory::new());
        for m in members {
            directory.insert(m.clone()).await;
        }
        let roles = Arc::new(MemoryRoleStore::new());
        Fixture {
            rbac: RbacService::new(directory, roles.clone()),
            roles,
        }
    }

    fn id(n: i32) -> MemberId {
        MemberId::from(n)
    }

    #[tokio::test]
    async fn test_self_edit_always_allowed() {
        let f = fixture(&[info(1, "MEM", "EXT")]).await;
        assert!(f.rbac.can_edit_member(id(1), id(1)).await);
        // Even for members missing from the directory.
        assert!(f.rbac.can_edit_member(id(42), id(42)).await);
    }

    #[tokio::test]
    async fn test_pres_and_evp_edit_across_committees() {
        let f = fixture(&[
            info(1, "PRES", "EXEC"),
            info(2, "EVP", "EXEC"),
            info(3, "AVP", "RND"),
            info(4, "MEM", "EXT"),
        ])
        .await;
        assert!(f.rbac.can_edit_member(id(1), id(3)).await);
        assert!(f.rbac.can_edit_member(id(1), id(2)).await);
        assert!(f.rbac.can_edit_member(id(2), id(4)).await);
        assert!(!f.rbac.can_edit_member(id(2), id(1)).await);
    }

    #[tokio::test]
    async fn test_vp_limited_to_own_committee() {
        let f = fixture(&[
            info(1, "VP", "RND"),
            info(2, "AVP", "RND"),
            info(3, "AVP", "EXT"),
        ])
        .await;
        assert!(f.rbac.can_edit_member(id(1), id(2)).await);
        assert!(!f.rbac.can_edit_member(id(1), id(3)).await);
    }

    #[tokio::test]
    async fn test_outranked_actor_denied() {
        let f = fixture(&[info(1, "CT", "RND"), info(2, "AVP", "RND")]).await;
        assert!(!f.rbac.can_edit_member(id(1), id(2)).await);
    }

    #[tokio::test]
    async fn test_avp_cannot_edit_even_lower_positions() {
        let f = fixture(&[info(1, "AVP", "RND"), info(2, "MEM", "RND")]).await;
        assert!(!f.rbac.can_edit_member(id(1), id(2)).await);
    }

    #[tokio::test]
    async fn test_admin_bypasses_hierarchy() {
        let f = fixture(&[info(1, "MEM", "EXT"), info(2, "PRES", "EXEC")]).await;
        f.roles.grant(id(1), &Role::admin(), None).await.unwrap();
        assert!(f.rbac.can_edit_member(id(1), id(2)).await);
        assert!(f.rbac.can_edit_field(id(1), id(2), EditableField::Email).await);
        assert_eq!(
            f.rbac.get_editable_fields(id(1), id(2)).await.len(),
            EditableField::all().count()
        );
    }

    #[tokio::test]
    async fn test_missing_target_denied() {
        let f = fixture(&[info(1, "PRES", "EXEC")]).await;
        assert!(!f.rbac.can_edit_member(id(1), id(99)).await);
    }

    #[tokio::test]
    async fn test_store_failures_fail_closed() {
        let rbac = RbacService::new(Arc::new(FailingDirectory), Arc::new(FailingRoles));
        assert!(!rbac.is_admin(id(1)).await);
        assert!(!rbac.has_role(id(1), "ADMIN").await);
        assert!(!rbac.can_edit_member(id(1), id(2)).await);
        assert!(!rbac.can_manage_roles(id(1)).await);
        assert!(!rbac.can_access_api_key_management(id(1)).await);
        assert!(!rbac.can_access_api_by_email("m1@example.org").await);
        assert!(rbac.get_editable_fields(id(1), id(2)).await.is_empty());
        assert!(rbac.can_edit_member(id(1), id(1)).await);
    }

    #[tokio::test]
    async fn test_field_rules_for_self() {
        let f = fixture(&[info(1, "MEM", "EXT")]).await;
        for field in EditableField::all() {
            assert_eq!(
                f.rbac.can_edit_field(id(1), id(1), field).await,
                field.is_self_editable(),
                "{field}"
            );
        }
        let fields = f.rbac.get_editable_fields(id(1), id(1)).await;
        assert!(fields.iter().all(EditableField::is_self_editable));
        assert_eq!(fields.len(), EditableField::SELF_EDITABLE.len());
    }

    #[tokio::test]
    async fn test_field_rules_for_unauthorized_editor() {
        let f = fixture(&[info(1, "CT", "RND"), info(2, "AVP", "RND")]).await;
        for field in EditableField::all() {
            assert!(!f.rbac.can_edit_field(id(1), id(2), field).await, "{field}");
        }
        assert!(f.rbac.get_editable_fields(id(1), id(2)).await.is_empty());
    }

    #[tokio::test]
    async fn test_field_rules_for_authorized_editor() {
        let f = fixture(&[info(1, "VP", "RND"), info(2, "JO", "RND")]).await;
        for field in EditableField::all() {
            assert!(f.rbac.can_edit_field(id(1), id(2), field).await, "{field}");
        }
        assert_eq!(
            f.rbac.get_editable_fields(id(1), id(2)).await.len(),
            EditableField::all().count()
        );
    }

    #[tokio::test]
    async fn test_view_is_permissive() {
        let f = fixture(&[]).await;
        assert!(f.rbac.can_view_member(id(1), id(2)).await);
    }

    #[tokio::test]
    async fn test_api_key_access_paths() {
        let f = fixture(&[
            info(1, "MEM", "RND"),
            info(2, "MEM", "EXT"),
            info(3, "AVP", "EXT"),
            info(4, "CT", "EXT"),
            info(5, "", ""),
        ])
        .await;
        assert!(f.rbac.can_access_api_key_management(id(1)).await);
        assert!(!f.rbac.can_access_api_key_management(id(2)).await);
        assert!(f.rbac.can_access_api_key_management(id(3)).await);
        assert!(!f.rbac.can_access_api_key_management(id(4)).await);
        assert!(!f.rbac.can_access_api_key_management(id(5)).await);

        f.roles.grant(id(2), &Role::admin(), None).await.unwrap();
        assert!(f.rbac.can_access_api_key_management(id(2)).await);
    }

    #[tokio::test]
    async fn test_api_access_by_email() {
        let f = fixture(&[info(1, "MEM", "RND"), info(2, "MEM", "EXT")]).await;
        assert!(f.rbac.can_access_api_by_email("m1@example.org").await);
        assert!(f.rbac.can_access_api_by_email("M1@EXAMPLE.ORG").await);
        assert!(!f.rbac.can_access_api_by_email("m2@example.org").await);
        assert!(!f.rbac.can_access_api_by_email("stranger@example.org").await);
    }

    #[tokio::test]
    async fn test_role_management_requires_admin() {
        let f = fixture(&[info(1, "PRES", "EXEC"), info(2, "MEM", "EXT")]).await;
        let err = f
            .rbac
            .grant_role(id(1), id(2), &Role::admin())
            .await
            .unwrap_err();
        assert_eq!(err.kind, memberhub_core::error::ErrorKind::Forbidden);

        f.roles.grant(id(1), &Role::admin(), None).await.unwrap();
        f.rbac.grant_role(id(1), id(2), &Role::admin()).await.unwrap();
        assert!(f.rbac.is_admin(id(2)).await);

        let roles = f.rbac.roles_for(id(2)).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].granted_by, Some(id(1)));

        f.rbac.revoke_role(id(1), id(2), &Role::admin()).await.unwrap();
        assert!(!f.rbac.is_admin(id(2)).await);
        let err = f
            .rbac
            .revoke_role(id(1), id(2), &Role::admin())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_grant_to_unknown_member_is_not_found() {
        let f = fixture(&[info(1, "MEM", "EXT")]).await;
        f.roles.grant(id(1), &Role::admin(), None).await.unwrap();
        let err = f
            .rbac
            .grant_role(id(1), id(77), &Role::admin())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
