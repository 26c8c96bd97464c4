//! Role identifier and role assignment entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use memberhub_core::{AppError, MemberId};

/// Maximum length of a role identifier.
const MAX_ROLE_LEN: usize = 32;

/// A role identifier such as `ADMIN`.
///
/// Identifiers are upper-case ASCII letters, digits, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct Role(String);

impl Role {
    /// Identifier of the administrator role.
    pub const ADMIN: &'static str = "ADMIN";

    /// The administrator role. Holding it bypasses every hierarchy check.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    /// Return the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the administrator role.
    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= MAX_ROLE_LEN
            && s.bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(AppError::validation(format!("Invalid role identifier: '{s}'")))
        }
    }
}

impl TryFrom<String> for Role {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

/// A row of the `member_roles` relation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleAssignment {
    /// Member holding the role.
    pub member_id: MemberId,
    /// The role held.
    pub role_id: Role,
    /// Member who granted the role, if recorded.
    pub granted_by: Option<MemberId>,
    /// When the role was granted.
    pub granted_at: DateTime<Utc>,
}
