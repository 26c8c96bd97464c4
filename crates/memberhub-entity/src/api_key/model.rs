//! API key entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use memberhub_core::{ApiKeyId, AppError};

/// Kind of API key, which decides its lifetime and origin binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Local development key; short-lived, bound to a localhost origin.
    Dev,
    /// Production key; long-lived, bound to a unique public origin.
    Prod,
    /// Administrative key; never expires, not origin-bound.
    Admin,
}

impl KeyType {
    /// Choose the key type from request flags. `is_admin` wins over `is_dev`.
    pub fn from_flags(is_dev: bool, is_admin: bool) -> Self {
        if is_admin {
            Self::Admin
        } else if is_dev {
            Self::Dev
        } else {
            Self::Prod
        }
    }

    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::validation(format!(
                "Invalid key type: '{s}'. Expected one of: dev, prod, admin"
            ))),
        }
    }
}

/// A stored API key. Only the SHA-256 hash of the token is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiKey {
    /// Key identifier.
    pub api_key_id: ApiKeyId,
    /// Email of the member the key was issued for.
    pub member_email: String,
    /// Hex SHA-256 of the token.
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    /// Optional project label.
    pub project: Option<String>,
    /// Origin the key is bound to (prod keys only).
    pub allowed_origin: Option<String>,
    /// Whether this is a dev key.
    pub is_dev: bool,
    /// Whether this is an admin key.
    pub is_admin: bool,
    /// Issuance time.
    pub created_at: DateTime<Utc>,
    /// Expiry time; `None` for admin keys.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Key type derived from the stored flags.
    pub fn key_type(&self) -> KeyType {
        KeyType::from_flags(self.is_dev, self.is_admin)
    }
}

/// Data required to store a newly issued API key.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    /// Email of the member the key was issued for.
    pub member_email: String,
    /// Hex SHA-256 of the token.
    pub api_key_hash: String,
    /// Optional project label.
    pub project: Option<String>,
    /// Bound origin (prod keys only).
    pub allowed_origin: Option<String>,
    /// Key type.
    pub key_type: KeyType,
    /// Expiry computed at issuance.
    pub expires_at: Option<DateTime<Utc>>,
}
