//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memberhub_auth::IssuedApiKey;
use memberhub_core::{ApiKeyId, MemberId};
use memberhub_entity::api_key::{ApiKey, KeyType};
use memberhub_entity::member::Member;
use memberhub_entity::role::RoleAssignment;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Version.
    pub version: String,
}

/// A member profile. Absent fields are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fb_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_id: Option<i32>,
}

impl From<Member> for MemberResponse {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            email: m.email,
            full_name: m.full_name,
            nickname: m.nickname,
            position_id: m.position_id,
            committee_id: m.committee_id,
            college: m.college,
            program: m.program,
            discord: m.discord,
            interests: m.interests,
            contact_number: m.contact_number,
            fb_link: m.fb_link,
            telegram: m.telegram,
            house_id: m.house_id,
        }
    }
}

/// Fields the caller may change on a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditableFieldsResponse {
    /// Target member.
    pub member_id: MemberId,
    /// Field names in a stable order.
    pub fields: Vec<String>,
}

/// A role assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    /// Role identifier.
    pub role: String,
    /// Who granted it.
    pub granted_by: Option<MemberId>,
    /// When it was granted.
    pub granted_at: DateTime<Utc>,
}

impl From<RoleAssignment> for RoleResponse {
    fn from(r: RoleAssignment) -> Self {
        Self {
            role: r.role_id.to_string(),
            granted_by: r.granted_by,
            granted_at: r.granted_at,
        }
    }
}

/// A freshly issued API key. The only time the raw token is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedKeyResponse {
    /// Owning member email.
    pub email: String,
    /// The raw token.
    pub api_key: String,
    /// Expiry, absent for admin keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<IssuedApiKey> for IssuedKeyResponse {
    fn from(k: IssuedApiKey) -> Self {
        Self {
            email: k.email,
            api_key: k.api_key,
            expires_at: k.expires_at,
        }
    }
}

/// A stored API key, without its hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeySummary {
    pub id: ApiKeyId,
    pub key_type: KeyType,
    pub project: Option<String>,
    pub allowed_origin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeySummary {
    fn from(k: ApiKey) -> Self {
        Self {
            id: k.api_key_id,
            key_type: k.key_type(),
            project: k.project,
            allowed_origin: k.allowed_origin,
            created_at: k.created_at,
            expires_at: k.expires_at,
        }
    }
}
