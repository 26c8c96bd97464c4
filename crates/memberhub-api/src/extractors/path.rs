//! Typed path parameter helpers.

use memberhub_core::{ApiKeyId, AppError, MemberId};

/// Parses a member ID from a path segment.
pub fn parse_member_id(s: &str) -> Result<MemberId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid member ID: {s}")))
}

/// Parses an API key ID from a path segment.
pub fn parse_api_key_id(s: &str) -> Result<ApiKeyId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid API key ID: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_member_id() {
        assert_eq!(parse_member_id("12212345").unwrap(), MemberId::from(12212345));
        assert!(parse_member_id("abc").unwrap_err().kind == memberhub_core::error::ErrorKind::Validation);
        assert!(parse_member_id("").is_err());
    }

    #[test]
    fn test_parse_api_key_id() {
        assert_eq!(parse_api_key_id("7").unwrap(), ApiKeyId::from(7));
        assert!(parse_api_key_id("7a").is_err());
    }
}
