//! API-key token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use memberhub_core::config::AuthConfig;
use memberhub_core::error::AppError;

use super::claims::ApiKeyClaims;

/// Verifies API-key tokens against the service secret.
#[derive(Clone)]
pub struct ApiKeyDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for ApiKeyDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl ApiKeyDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present; admin keys carry none.
        validation.set_required_spec_claims::<&str>(&[]);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> Result<ApiKeyClaims, AppError> {
        let data = decode::<ApiKeyClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("API key has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid API key signature")
                }
                _ => AppError::unauthorized(format!("Invalid API key: {e}")),
            },
        )?;

        if data.claims.email.trim().is_empty() {
            return Err(AppError::unauthorized("API key carries no email"));
        }
        Ok(data.claims)
    }
}
