//! Organizational positions and their authority levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Positions in the organization, highest authority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    /// President.
    Pres,
    /// Executive Vice President.
    Evp,
    /// Vice President (heads a committee).
    Vp,
    /// Associate Vice President.
    Avp,
    /// Committee Trainee.
    Ct,
    /// Junior Officer.
    Jo,
    /// Member.
    Mem,
}

impl Position {
    /// All positions, highest level first.
    pub const ALL: [Position; 7] = [
        Self::Pres,
        Self::Evp,
        Self::Vp,
        Self::Avp,
        Self::Ct,
        Self::Jo,
        Self::Mem,
    ];

    /// Authority level; higher outranks lower.
    pub fn level(&self) -> u8 {
        match self {
            Self::Pres => 7,
            Self::Evp => 6,
            Self::Vp => 5,
            Self::Avp => 4,
            Self::Ct => 3,
            Self::Jo => 2,
            Self::Mem => 1,
        }
    }

    /// The identifier as stored in the `positions` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pres => "PRES",
            Self::Evp => "EVP",
            Self::Vp => "VP",
            Self::Avp => "AVP",
            Self::Ct => "CT",
            Self::Jo => "JO",
            Self::Mem => "MEM",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = memberhub_core::AppError;

    /// Identifiers are case-sensitive, matching the stored form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                memberhub_core::AppError::validation(format!("Unknown position: '{s}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_descend() {
        let levels: Vec<u8> = Position::ALL.iter().map(Position::level).collect();
        assert_eq!(levels, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("AVP".parse::<Position>().unwrap(), Position::Avp);
        assert!("avp".parse::<Position>().is_err());
        assert!("".parse::<Position>().is_err());
    }
}
