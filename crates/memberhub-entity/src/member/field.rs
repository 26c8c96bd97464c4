//! Member profile fields subject to field-level edit authorization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A member profile field that can be edited through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditableField {
    // Self-editable
    Nickname,
    Telegram,
    Discord,
    Interests,
    ContactNumber,
    FbLink,
    // Authorized-editable
    FullName,
    Email,
    PositionId,
    CommitteeId,
    College,
    Program,
    HouseId,
}

impl EditableField {
    /// Fields a member may always change on their own profile.
    pub const SELF_EDITABLE: &'static [EditableField] = &[
        Self::Nickname,
        Self::Telegram,
        Self::Discord,
        Self::Interests,
        Self::ContactNumber,
        Self::FbLink,
    ];

    /// Fields that only an authorized editor may change.
    pub const AUTHORIZED_EDITABLE: &'static [EditableField] = &[
        Self::FullName,
        Self::Email,
        Self::PositionId,
        Self::CommitteeId,
        Self::College,
        Self::Program,
        Self::HouseId,
    ];

    /// Every known field.
    pub fn all() -> impl Iterator<Item = EditableField> {
        Self::SELF_EDITABLE
            .iter()
            .chain(Self::AUTHORIZED_EDITABLE)
            .copied()
    }

    /// Whether the field belongs to the self-editable set.
    pub fn is_self_editable(&self) -> bool {
        Self::SELF_EDITABLE.contains(self)
    }

    /// Whether the field belongs to the authorized-editable set.
    pub fn is_authorized_editable(&self) -> bool {
        Self::AUTHORIZED_EDITABLE.contains(self)
    }

    /// Column name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nickname => "nickname",
            Self::Telegram => "telegram",
            Self::Discord => "discord",
            Self::Interests => "interests",
            Self::ContactNumber => "contact_number",
            Self::FbLink => "fb_link",
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::PositionId => "position_id",
            Self::CommitteeId => "committee_id",
            Self::College => "college",
            Self::Program => "program",
            Self::HouseId => "house_id",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditableField {
    type Err = memberhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all().find(|f| f.as_str() == s).ok_or_else(|| {
            memberhub_core::AppError::validation(format!("Unknown member field: '{s}'"))
        })
    }
}
