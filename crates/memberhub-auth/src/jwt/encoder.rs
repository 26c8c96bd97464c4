//! API-key token creation with type-dependent expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use memberhub_core::config::AuthConfig;
use memberhub_core::error::AppError;
use memberhub_entity::api_key::KeyType;

use super::claims::ApiKeyClaims;

/// Signs API-key tokens with HMAC-SHA256.
#[derive(Clone)]
pub struct ApiKeyIssuer {
    encoding_key: EncodingKey,
    dev_expiry_days: i64,
    prod_expiry_days: i64,
}

impl std::fmt::Debug for ApiKeyIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyIssuer")
            .field("dev_expiry_days", &self.dev_expiry_days)
            .field("prod_expiry_days", &self.prod_expiry_days)
            .finish()
    }
}

impl ApiKeyIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            dev_expiry_days: config.dev_expiry_days,
            prod_expiry_days: config.prod_expiry_days,
        }
    }

    /// Lifetime of a key type; `None` means the key never expires.
    pub fn lifetime(&self, key_type: KeyType) -> Result<Option<Duration>, AppError> {
        let days = match key_type {
            KeyType::Dev => self.dev_expiry_days,
            KeyType::Prod => self.prod_expiry_days,
            KeyType::Admin => return Ok(None),
        };
        Duration::try_days(days).map(Some).ok_or_else(|| {
            AppError::internal(format!("API key lifetime of {days} days is out of range"))
        })
    }

    /// Issues a token for `email`, returning it with its expiry.
    pub fn issue(
        &self,
        email: &str,
        key_type: KeyType,
    ) -> Result<(String, Option<DateTime<Utc>>), AppError> {
        self.issue_at(email, key_type, Utc::now())
    }

    /// Issues a token as of `now`. Identical inputs produce identical tokens.
    pub fn issue_at(
        &self,
        email: &str,
        key_type: KeyType,
        now: DateTime<Utc>,
    ) -> Result<(String, Option<DateTime<Utc>>), AppError> {
        let expires_at = match self.lifetime(key_type)? {
            Some(ttl) => Some(now.checked_add_signed(ttl).ok_or_else(|| {
                AppError::internal("API key expiry is out of range")
            })?),
            None => None,
        };
        let claims = ApiKeyClaims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.map(|e| e.timestamp()),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode API key: {e}")))?;

        Ok((token, expires_at))
    }
}
