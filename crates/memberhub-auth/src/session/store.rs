//! Session persistence contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use memberhub_core::{AppResult, MemberId};
use memberhub_database::repositories::SessionRepository;
use memberhub_entity::session::{NewSession, SessionWithMember};

/// Persistence operations for web sessions.
///
/// Every method is a single atomic row operation; callers hold no
/// in-process locks around them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session row.
    async fn create(&self, session: &NewSession) -> AppResult<()>;

    /// Find an unexpired session, joined with the owner's email and name.
    async fn find_active(&self, id: &str) -> AppResult<Option<SessionWithMember>>;

    /// Record activity on a session.
    async fn update_activity(&self, id: &str) -> AppResult<()>;

    /// Set a new expiry.
    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Delete one session. Returns `true` if it existed.
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Delete all sessions of a member. Returns the number removed.
    async fn delete_all_for_member(&self, member_id: MemberId) -> AppResult<u64>;

    /// Delete sessions past their expiry. Returns the number removed.
    async fn delete_expired(&self) -> AppResult<u64>;
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, session: &NewSession) -> AppResult<()> {
        SessionRepository::create(self, session).await
    }

    async fn find_active(&self, id: &str) -> AppResult<Option<SessionWithMember>> {
        SessionRepository::find_active(self, id).await
    }

    async fn update_activity(&self, id: &str) -> AppResult<()> {
        SessionRepository::update_activity(self, id).await
    }

    async fn extend(&self, id: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        SessionRepository::extend(self, id, expires_at).await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        SessionRepository::delete(self, id).await
    }

    async fn delete_all_for_member(&self, member_id: MemberId) -> AppResult<u64> {
        self.delete_by_member(member_id).await
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        SessionRepository::delete_expired(self).await
    }
}
