//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use memberhub_auth::KeyRequest;

/// Query of `GET /auth/google/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    /// `"true"` requests a long-lived session.
    pub remember: Option<String>,
    /// Frontend path to return to.
    pub redirect: Option<String>,
}

/// Query Google sends to `GET /auth/google/callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code.
    pub code: Option<String>,
    /// Round-tripped login state.
    pub state: Option<String>,
    /// Set when the user denied consent.
    pub error: Option<String>,
}

/// Body of `POST /request-key`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestKeyRequest {
    /// Member the key is for.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Optional project label.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub project: Option<String>,
    /// Origin the key will be used from.
    #[serde(default)]
    pub allowed_origin: Option<String>,
    /// Request a dev key.
    #[serde(default)]
    pub is_dev: bool,
    /// Request an admin key.
    #[serde(default)]
    pub is_admin: bool,
}

impl From<RequestKeyRequest> for KeyRequest {
    fn from(req: RequestKeyRequest) -> Self {
        Self {
            email: req.email,
            project: req.project,
            allowed_origin: req.allowed_origin,
            is_dev: req.is_dev,
            is_admin: req.is_admin,
        }
    }
}

/// Body of `POST /auth/members/{id}/roles`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GrantRoleRequest {
    /// Role identifier, e.g. `ADMIN`.
    #[validate(length(min = 1, max = 32, message = "Role is required"))]
    pub role: String,
}
