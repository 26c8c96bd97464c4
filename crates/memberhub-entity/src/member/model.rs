//! Member entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use memberhub_core::MemberId;

/// A full member record as stored in the `members` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    /// Stable numeric identifier.
    pub id: MemberId,
    /// Unique email; binds OAuth identities and API keys to the member.
    pub email: String,
    /// Full legal name.
    pub full_name: String,
    /// Preferred nickname.
    pub nickname: Option<String>,
    /// Position identifier (`PRES`, `EVP`, ...).
    pub position_id: Option<String>,
    /// Committee identifier (`RND`, `EXT`, ...).
    pub committee_id: Option<String>,
    /// College the member belongs to.
    pub college: Option<String>,
    /// Degree program.
    pub program: Option<String>,
    /// House assignment.
    pub house_id: Option<i32>,
    /// Telegram handle.
    pub telegram: Option<String>,
    /// Discord handle.
    pub discord: Option<String>,
    /// Free-form interests.
    pub interests: Option<String>,
    /// Contact number.
    pub contact_number: Option<String>,
    /// Facebook profile link.
    pub fb_link: Option<String>,
    /// Profile image URL.
    pub image_url: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Project the authorization-relevant subset of this record.
    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            position_id: self.position_id.clone(),
            committee_id: self.committee_id.clone(),
        }
    }
}

/// The identity subset of a member consumed by authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MemberInfo {
    /// Stable numeric identifier.
    pub id: MemberId,
    /// Unique email.
    pub email: String,
    /// Full name.
    pub full_name: String,
    /// Position identifier, if assigned.
    pub position_id: Option<String>,
    /// Committee identifier, if assigned.
    pub committee_id: Option<String>,
}

impl MemberInfo {
    /// Position identifier or the empty string (level 0).
    pub fn position(&self) -> &str {
        self.position_id.as_deref().unwrap_or("")
    }

    /// Committee identifier or the empty string.
    pub fn committee(&self) -> &str {
        self.committee_id.as_deref().unwrap_or("")
    }
}
