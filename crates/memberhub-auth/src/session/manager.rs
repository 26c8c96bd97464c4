//! Session issuance and sliding expiration.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, info};

use memberhub_core::config::SessionConfig;
use memberhub_core::error::AppError;
use memberhub_core::{AppResult, MemberId};
use memberhub_entity::session::{
    NewSession, SESSION_ID_LEN, Session, SessionWithMember, short_id,
};

use super::store::SessionStore;

/// Number of random bytes in a session identifier.
const SESSION_ID_BYTES: usize = SESSION_ID_LEN / 2;

/// Generates a 256-bit session identifier from the OS CSPRNG, hex-encoded.
pub fn generate_session_id() -> AppResult<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::internal(format!("Failed to generate session ID: {e}")))?;
    Ok(hex::encode(bytes))
}

/// Whether `id` has the shape of a session identifier.
fn is_well_formed(id: &str) -> bool {
    id.len() == SESSION_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Issues, resolves, extends, and deletes web sessions.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Nominal lifetime of a new session.
    pub fn duration_for(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.config.remember_duration()
        } else {
            self.config.duration()
        }
    }

    /// Creates and persists a session for `member_id`.
    ///
    /// The returned value is built in memory, not re-read from the store.
    pub async fn create_session(
        &self,
        member_id: MemberId,
        remember_me: bool,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> AppResult<Session> {
        let id = generate_session_id()?;
        let now = Utc::now();
        let new = NewSession {
            id,
            member_id,
            created_at: now,
            expires_at: expiry_after(now, self.duration_for(remember_me))?,
            user_agent: user_agent.filter(|s| !s.is_empty()).map(String::from),
            ip_address: ip_address.filter(|s| !s.is_empty()).map(String::from),
        };

        self.store.create(&new).await?;

        let session = new.into_session();
        info!(
            member_id = %member_id,
            session_id = %session.short_id(),
            remember_me,
            expires_at = %session.expires_at,
            "Session created"
        );
        Ok(session)
    }

    /// Resolves an unexpired session. Malformed identifiers never reach
    /// the store.
    pub async fn get_session(&self, id: &str) -> AppResult<Option<SessionWithMember>> {
        if !is_well_formed(id) {
            debug!(session_id = %short_id(id), "Rejected malformed session ID");
            return Ok(None);
        }
        self.store.find_active(id).await
    }

    /// `true` once less than `threshold × duration` remains.
    pub fn should_extend(&self, session: &Session, duration: Duration) -> bool {
        should_extend_at(session, duration, self.config.extend_threshold, Utc::now())
    }

    /// Sets the expiry to now + `duration`, unconditionally.
    pub async fn extend_session(&self, id: &str, duration: Duration) -> AppResult<DateTime<Utc>> {
        let expires_at = expiry_after(Utc::now(), duration)?;
        self.store.extend(id, expires_at).await?;
        debug!(session_id = %short_id(id), expires_at = %expires_at, "Session extended");
        Ok(expires_at)
    }

    /// Records activity on a session.
    pub async fn update_activity(&self, id: &str) -> AppResult<()> {
        self.store.update_activity(id).await
    }

    /// Deletes one session. Deleting an unknown session is a no-op.
    pub async fn delete_session(&self, id: &str) -> AppResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(session_id = %short_id(id), "Session deleted");
        }
        Ok(deleted)
    }

    /// Deletes every session of a member ("log out everywhere").
    pub async fn delete_all_for_member(&self, member_id: MemberId) -> AppResult<u64> {
        let count = self.store.delete_all_for_member(member_id).await?;
        info!(member_id = %member_id, count, "All member sessions deleted");
        Ok(count)
    }

    /// Deletes sessions past their expiry.
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        self.store.delete_expired().await
    }
}

fn expiry_after(now: DateTime<Utc>, duration: Duration) -> AppResult<DateTime<Utc>> {
    now.checked_add_signed(duration)
        .ok_or_else(|| AppError::internal("Session expiry is out of range"))
}

/// Sliding-extension predicate evaluated at a fixed instant.
pub fn should_extend_at(
    session: &Session,
    duration: Duration,
    threshold: f64,
    now: DateTime<Utc>,
) -> bool {
    let remaining = session.expires_at - now;
    let limit_ms = (duration.num_milliseconds() as f64 * threshold) as i64;
    remaining < Duration::milliseconds(limit_ms)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::memory::{MemoryMemberDirectory, MemorySessionStore};
    use memberhub_entity::member::MemberInfo;

    async fn manager() -> (SessionManager, Arc<MemorySessionStore>) {
        let members = Arc::new(MemoryMemberDirectory::new());
        members
            .insert(MemberInfo {
                id: MemberId::from(1),
                email: "a@example.org".to_string(),
                full_name: "Ada".to_string(),
                position_id: Some("MEM".to_string()),
                committee_id: None,
            })
            .await;
        let store = Arc::new(MemorySessionStore::new(members));
        (
            SessionManager::new(store.clone(), SessionConfig::default()),
            store,
        )
    }

    fn assert_close(actual: DateTime<Utc>, expected: DateTime<Utc>) {
        let diff = (actual - expected).num_seconds().abs();
        assert!(diff <= 5, "expiry off by {diff}s");
    }

    fn session_expiring_in(remaining: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: "0".repeat(SESSION_ID_LEN),
            member_id: MemberId::from(1),
            created_at: now,
            expires_at: now + remaining,
            last_activity: now,
            user_agent: None,
            ip_address: None,
        }
    }

    #[test]
    fn test_generated_ids() {
        let mut seen = HashSet::new();
        for _ in 0..64 {
            let id = generate_session_id().unwrap();
            assert_eq!(id.len(), 64);
            assert!(is_well_formed(&id));
            assert!(seen.insert(id));
        }
    }

    #[tokio::test]
    async fn test_create_default_duration() {
        let (manager, store) = manager().await;
        let session = manager
            .create_session(MemberId::from(1), false, Some("curl/8"), Some("10.0.0.1"))
            .await
            .unwrap();
        assert_close(session.expires_at, Utc::now() + Duration::hours(24));
        assert_eq!(session.created_at, session.last_activity);
        assert_eq!(session.id.len(), 64);
        assert!(store.get_raw(&session.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_remember_me_duration() {
        let (manager, _) = manager().await;
        let session = manager
            .create_session(MemberId::from(1), true, None, None)
            .await
            .unwrap();
        assert_close(session.expires_at, Utc::now() + Duration::days(30));
    }

    #[tokio::test]
    async fn test_consecutive_sessions_differ() {
        let (manager, _) = manager().await;
        let a = manager
            .create_session(MemberId::from(1), false, None, None)
            .await
            .unwrap();
        let b = manager
            .create_session(MemberId::from(1), false, None, None)
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_should_extend_threshold() {
        let day = Duration::hours(24);
        let now = Utc::now();
        let mut s = session_expiring_in(Duration::hours(11));
        s.expires_at = now + Duration::hours(11);
        assert!(should_extend_at(&s, day, 0.5, now));
        s.expires_at = now + Duration::hours(13);
        assert!(!should_extend_at(&s, day, 0.5, now));
    }

    #[tokio::test]
    async fn test_should_extend_uses_configured_threshold() {
        let (manager, _) = manager().await;
        let day = Duration::hours(24);
        assert!(manager.should_extend(&session_expiring_in(Duration::hours(11)), day));
        assert!(!manager.should_extend(&session_expiring_in(Duration::hours(13)), day));
    }

    #[tokio::test]
    async fn test_extend_moves_expiry() {
        let (manager, store) = manager().await;
        let session = manager
            .create_session(MemberId::from(1), false, None, None)
            .await
            .unwrap();
        store.set_expiry(&session.id, Utc::now() + Duration::hours(1)).await;

        let new_expiry = manager
            .extend_session(&session.id, Duration::hours(24))
            .await
            .unwrap();
        assert_close(new_expiry, Utc::now() + Duration::hours(24));
        let stored = store.get_raw(&session.id).await.unwrap();
        assert_eq!(stored.expires_at, new_expiry);
    }

    #[tokio::test]
    async fn test_get_session_resolves_member() {
        let (manager, store) = manager().await;
        let session = manager
            .create_session(MemberId::from(1), false, None, None)
            .await
            .unwrap();

        let found = manager.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.email, "a@example.org");
        assert_eq!(found.session.member_id, MemberId::from(1));

        store
            .set_expiry(&session.id, Utc::now() - Duration::seconds(1))
            .await;
        assert!(manager.get_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_ids_resolve_to_none() {
        let (manager, _) = manager().await;
        assert!(manager.get_session("").await.unwrap().is_none());
        assert!(manager.get_session("abc").await.unwrap().is_none());
        assert!(manager.get_session(&"z".repeat(64)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_session_leaves_others() {
        let (manager, store) = manager().await;
        let keep = manager
            .create_session(MemberId::from(1), false, None, None)
            .await
            .unwrap();

        let deleted = manager
            .delete_session(&generate_session_id().unwrap())
            .await
            .unwrap();
        assert!(!deleted);
        assert_eq!(store.len().await, 1);
        assert!(manager.get_session(&keep.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_all_for_member() {
        let (manager, store) = manager().await;
        for _ in 0..3 {
            manager
                .create_session(MemberId::from(1), false, None, None)
                .await
                .unwrap();
        }
        manager
            .create_session(MemberId::from(2), false, None, None)
            .await
            .unwrap();

        let deleted = manager
            .delete_all_for_member(MemberId::from(1))
            .await
            .unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_extend_out_of_range_is_an_error() {
        let (manager, store) = manager().await;
        let session = manager
            .create_session(MemberId::from(1), false, None, None)
            .await
            .unwrap();
        let before = store.get_raw(&session.id).await.unwrap().expires_at;

        let err = manager
            .extend_session(&session.id, Duration::MAX)
            .await
            .unwrap_err();
        assert_eq!(err.kind, memberhub_core::error::ErrorKind::Internal);
        assert_eq!(store.get_raw(&session.id).await.unwrap().expires_at, before);
    }
}
