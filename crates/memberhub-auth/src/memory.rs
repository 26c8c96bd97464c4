//! In-memory collaborators for single-node deployments and tests.
//!
//! Each store guards its state with a Tokio lock and mirrors the semantics
//! of the corresponding SQL: session lookups ignore expired rows and join
//! the owning member, role grants are idempotent, and key revocation
//! requires the owning email.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use memberhub_core::{ApiKeyId, AppError, AppResult, MemberId};
use memberhub_entity::api_key::{ApiKey, KeyType, NewApiKey};
use memberhub_entity::member::{Member, MemberInfo};
use memberhub_entity::role::{Role, RoleAssignment};
use memberhub_entity::session::{NewSession, Session, SessionWithMember};

use crate::apikey::ApiKeyStore;
use crate::directory::{MemberDirectory, RoleStore};
use crate::session::SessionStore;

/// In-memory member directory.
#[derive(Debug, Default)]
pub struct MemoryMemberDirectory {
    members: RwLock<HashMap<MemberId, Member>>,
}

impl MemoryMemberDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a member with an otherwise empty profile.
    pub async fn insert(&self, info: MemberInfo) {
        self.insert_profile(Member {
            id: info.id,
            email: info.email,
            full_name: info.full_name,
            nickname: None,
            position_id: info.position_id,
            committee_id: info.committee_id,
            college: None,
            program: None,
            house_id: None,
            telegram: None,
            discord: None,
            interests: None,
            contact_number: None,
            fb_link: None,
            image_url: None,
            created_at: Utc::now(),
        })
        .await;
    }

    /// Adds or replaces a full member profile.
    pub async fn insert_profile(&self, member: Member) {
        self.members.write().await.insert(member.id, member);
    }
}

#[async_trait]
impl MemberDirectory for MemoryMemberDirectory {
    async fn find_by_id(&self, id: MemberId) -> AppResult<Option<MemberInfo>> {
        Ok(self.members.read().await.get(&id).map(Member::info))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<MemberInfo>> {
        Ok(self
            .members
            .read()
            .await
            .values()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .map(Member::info))
    }

    async fn find_profile(&self, id: MemberId) -> AppResult<Option<Member>> {
        Ok(self.members.read().await.get(&id).cloned())
    }
}

/// In-memory role assignment relation.
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    assignments: Mutex<Vec<RoleAssignment>>,
}

impl MemoryRoleStore {
    /// Creates an empty role store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn has_role(&self, member_id: MemberId, role: &str) -> AppResult<bool> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .any(|a| a.member_id == member_id && a.role_id.as_str() == role))
    }

    async fn roles_for(&self, member_id: MemberId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|a| a.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn grant(
        &self,
        member_id: MemberId,
        role: &Role,
        granted_by: Option<MemberId>,
    ) -> AppResult<()> {
        let mut assignments = self.assignments.lock().await;
        let exists = assignments
            .iter()
            .any(|a| a.member_id == member_id && &a.role_id == role);
        if !exists {
            assignments.push(RoleAssignment {
                member_id,
                role_id: role.clone(),
                granted_by,
                granted_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn revoke(&self, member_id: MemberId, role: &Role) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|a| !(a.member_id == member_id && &a.role_id == role));
        Ok(assignments.len() != before)
    }
}

/// In-memory session store joined against a [`MemoryMemberDirectory`].
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    members: Arc<MemoryMemberDirectory>,
}

impl MemorySessionStore {
    /// Creates an empty store that resolves owners through `members`.
    pub fn new(members: Arc<MemoryMemberDirectory>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            members,
        }
    }

    /// Returns a stored session regardless of expiry.
    pub async fn get_raw(&self, id: &str) -> Option<Session> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Overwrites a session's expiry without any policy checks.
    pub async fn set_expiry(&self, id: &str, expires_at: DateTime<Utc>) {
        if let Some(session) = self.sessions.lock().await.get_mut(id) {
            session.expires_at = expires_at;
        }
    }

    /// Number of stored rows, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &NewSession) -> AppResult<()> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::conflict("Session identifier already exists"));
        }
        sessions.insert(session.id.clone(), session.clone().into_session());
        Ok(())
    }

    async fn find_active(&self, id: &str) -> AppResult<Option<SessionWithMember>> {
        let session = match self.sessions.lock().await.get(id) {
            Some(s) if s.expires_at > Utc::now() => s.clone(),
            _ => return Ok(None),
        };
        let member = self.members.find_by_id(session.member_id).await?;
        Ok(member.map(|m| SessionWithMember {
            session,
            email: m.email,
            full_name: m.full_name,
        }))
    }

    async fn update_activity(&self, id: &str) -> AppResult<()> {
        if let Some(session) = self.sessions.lock().await.get_mut(id) {
            session.last_activity = Utc::now();
        }
        Ok(())
    }

    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.set_expiry(id, expires_at).await;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.sessions.lock().await.remove(id).is_some())
    }

    async fn delete_all_for_member(&self, member_id: MemberId) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.member_id != member_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at >= now);
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory API key store.
#[derive(Debug)]
pub struct MemoryApiKeyStore {
    keys: Mutex<Vec<ApiKey>>,
    next_id: AtomicI32,
}

impl Default for MemoryApiKeyStore {
    fn default() -> Self {
        Self {
            keys: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
        }
    }
}

impl MemoryApiKeyStore {
    /// Creates an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored key, including hashes.
    pub async fn all(&self) -> Vec<ApiKey> {
        self.keys.lock().await.clone()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    async fn store(&self, key: &NewApiKey) -> AppResult<ApiKey> {
        let mut keys = self.keys.lock().await;
        if keys.iter().any(|k| k.api_key_hash == key.api_key_hash) {
            return Err(AppError::conflict("API key hash already stored"));
        }
        if let Some(origin) = &key.allowed_origin {
            if keys.iter().any(|k| k.allowed_origin.as_ref() == Some(origin)) {
                return Err(AppError::conflict(format!(
                    "API key for origin {origin} already exists"
                )));
            }
        }
        let stored = ApiKey {
            api_key_id: ApiKeyId::from(self.next_id.fetch_add(1, Ordering::Relaxed)),
            member_email: key.member_email.clone(),
            api_key_hash: key.api_key_hash.clone(),
            project: key.project.clone(),
            allowed_origin: key.allowed_origin.clone(),
            is_dev: key.key_type == KeyType::Dev,
            is_admin: key.key_type == KeyType::Admin,
            created_at: Utc::now(),
            expires_at: key.expires_at,
        };
        keys.push(stored.clone());
        Ok(stored)
    }

    async fn origin_exists(&self, origin: &str) -> AppResult<bool> {
        Ok(self
            .keys
            .lock()
            .await
            .iter()
            .any(|k| k.allowed_origin.as_deref() == Some(origin)))
    }

    async fn list_for_email(&self, email: &str) -> AppResult<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self
            .keys
            .lock()
            .await
            .iter()
            .filter(|k| k.member_email == email)
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn revoke(&self, id: ApiKeyId, email: &str) -> AppResult<bool> {
        let mut keys = self.keys.lock().await;
        let before = keys.len();
        keys.retain(|k| !(k.api_key_id == id && k.member_email == email));
        Ok(keys.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member(id: i32, email: &str) -> MemberInfo {
        MemberInfo {
            id: MemberId::from(id),
            email: email.to_string(),
            full_name: format!("Member {id}"),
            position_id: Some("MEM".to_string()),
            committee_id: None,
        }
    }

    fn new_session(id: &str, member_id: i32, ttl: Duration) -> NewSession {
        let now = Utc::now();
        NewSession {
            id: id.to_string(),
            member_id: MemberId::from(member_id),
            created_at: now,
            expires_at: now + ttl,
            user_agent: None,
            ip_address: None,
        }
    }

    #[tokio::test]
    async fn test_find_active_skips_expired_and_joins_member() {
        let members = Arc::new(MemoryMemberDirectory::new());
        members.insert(member(1, "a@example.org")).await;
        let store = MemorySessionStore::new(members);

        store.create(&new_session("live", 1, Duration::hours(1))).await.unwrap();
        store.create(&new_session("dead", 1, Duration::hours(-1))).await.unwrap();

        let live = store.find_active("live").await.unwrap().unwrap();
        assert_eq!(live.email, "a@example.org");
        assert!(store.find_active("dead").await.unwrap().is_none());
        assert!(store.find_active("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_counts() {
        let members = Arc::new(MemoryMemberDirectory::new());
        let store = MemorySessionStore::new(members);
        store.create(&new_session("a", 1, Duration::hours(-2))).await.unwrap();
        store.create(&new_session("b", 1, Duration::hours(-1))).await.unwrap();
        store.create(&new_session("c", 1, Duration::hours(1))).await.unwrap();

        assert_eq!(store.delete_expired().await.unwrap(), 2);
        assert_eq!(store.len().await, 1);
        assert!(store.get_raw("c").await.is_some());
    }

    #[tokio::test]
    async fn test_role_grant_is_idempotent() {
        let roles = MemoryRoleStore::new();
        let id = MemberId::from(9);
        roles.grant(id, &Role::admin(), None).await.unwrap();
        roles.grant(id, &Role::admin(), None).await.unwrap();
        assert_eq!(roles.roles_for(id).await.unwrap().len(), 1);
        assert!(roles.is_admin(id).await.unwrap());
        assert!(roles.revoke(id, &Role::admin()).await.unwrap());
        assert!(!roles.revoke(id, &Role::admin()).await.unwrap());
    }
}
