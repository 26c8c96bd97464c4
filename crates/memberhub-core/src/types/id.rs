//! Newtype wrappers around the integer primary keys used by the member
//! directory.
//!
//! Using distinct types prevents accidentally passing an `ApiKeyId` where a
//! `MemberId` is expected. Both encode as `INTEGER` in PostgreSQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around `i32`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Return the inner integer value.
            pub fn value(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> i32 {
                id.0
            }
        }
    };
}

define_id!(
    /// Stable numeric identifier of a member (student ID number).
    MemberId
);

define_id!(
    /// Identifier of a stored API key record.
    ApiKeyId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_display() {
        assert_eq!(MemberId(12212345).to_string(), "12212345");
    }

    #[test]
    fn test_member_id_from_str() {
        let id: MemberId = "42".parse().expect("should parse");
        assert_eq!(id, MemberId(42));
        assert!("abc".parse::<MemberId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&ApiKeyId(7)).expect("serialize");
        assert_eq!(json, "7");
    }
}
