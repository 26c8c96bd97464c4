//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use memberhub_core::MemberId;

/// Length of a hex-encoded session identifier.
pub const SESSION_ID_LEN: usize = 64;

/// A server-side web session.
///
/// The identifier is 32 random bytes, hex-encoded, and doubles as the
/// bearer credential carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Opaque identifier (64 hex characters).
    pub id: String,
    /// Owning member.
    pub member_id: MemberId,
    /// Login time.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry; moved forward by sliding extension.
    pub expires_at: DateTime<Utc>,
    /// Last observed activity.
    pub last_activity: DateTime<Utc>,
    /// User-Agent header at login.
    pub user_agent: Option<String>,
    /// Client address at login.
    pub ip_address: Option<String>,
}

impl Session {
    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Time left before expiry; negative once expired.
    pub fn remaining(&self) -> chrono::Duration {
        self.expires_at - Utc::now()
    }

    /// First eight characters of the identifier, for logging.
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// A session joined with the owning member's identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionWithMember {
    /// The session row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub session: Session,
    /// Owning member's email.
    pub email: String,
    /// Owning member's full name.
    pub full_name: String,
}

/// Data required to persist a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// Opaque identifier.
    pub id: String,
    /// Owning member.
    pub member_id: MemberId,
    /// Issuance time; also the initial last-activity time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Client address.
    pub ip_address: Option<String>,
}

impl NewSession {
    /// The session as it looks right after insertion.
    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            member_id: self.member_id,
            created_at: self.created_at,
            expires_at: self.expires_at,
            last_activity: self.created_at,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
        }
    }
}

/// Truncate a session identifier for log output.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
