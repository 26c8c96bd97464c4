//! Authentication configuration: API-key signing and Google OAuth.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for API-key signing (HMAC-SHA256). Required.
    #[serde(default)]
    pub jwt_secret: String,
    /// Lifetime of `dev` API keys in days.
    #[serde(default = "default_dev_expiry")]
    pub dev_expiry_days: i64,
    /// Lifetime of `prod` API keys in days.
    #[serde(default = "default_prod_expiry")]
    pub prod_expiry_days: i64,
    /// Google OAuth client ID. Also the audience expected in Google ID tokens.
    #[serde(default)]
    pub google_client_id: String,
    /// Google OAuth client secret.
    #[serde(default)]
    pub google_client_secret: String,
    /// Redirect URL registered with Google for the OAuth callback.
    #[serde(default = "default_redirect_url")]
    pub oauth_redirect_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            dev_expiry_days: default_dev_expiry(),
            prod_expiry_days: default_prod_expiry(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            oauth_redirect_url: default_redirect_url(),
        }
    }
}

fn default_dev_expiry() -> i64 {
    30
}

fn default_prod_expiry() -> i64 {
    365
}

fn default_redirect_url() -> String {
    "http://localhost:8080/auth/google/callback".to_string()
}
