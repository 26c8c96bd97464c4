//! Google ID-token verification against Google's published signing keys.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

use memberhub_core::config::AuthConfig;
use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::AppResult;

/// Google's JWKS endpoint.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuers Google uses in ID tokens.
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// How long fetched signing keys are trusted before refetching.
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);

/// Minimum spacing between JWKS fetches triggered by cache misses.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Identity asserted by a verified third-party ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Verified email address.
    pub email: String,
    /// Display name, if present.
    pub name: Option<String>,
}

/// Verifies externally issued ID tokens.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    /// Verify `token` and return the identity it asserts.
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity>;
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug)]
struct CachedKeys {
    keys: JwkSet,
    fetched_at: Option<Instant>,
}

impl CachedKeys {
    fn is_fresh(&self, ttl: Duration) -> bool {
        match self.fetched_at {
            Some(at) => at.elapsed() < ttl,
            // Statically provided keys never go stale.
            None => true,
        }
    }
}

/// Verifies Google ID tokens (RS256) for a configured audience.
pub struct GoogleIdTokenVerifier {
    client_id: String,
    jwks_url: String,
    http: reqwest::Client,
    key_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
    last_refresh: Mutex<Option<Instant>>,
}

impl std::fmt::Debug for GoogleIdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdTokenVerifier")
            .field("client_id", &self.client_id)
            .field("jwks_url", &self.jwks_url)
            .finish()
    }
}

impl GoogleIdTokenVerifier {
    /// Creates a verifier that fetches keys from Google.
    pub fn new(config: &AuthConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            http,
            key_ttl: DEFAULT_KEY_TTL,
            cache: RwLock::new(None),
            last_refresh: Mutex::new(None),
        }
    }

    /// Overrides the JWKS endpoint.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    /// Creates a verifier with a fixed key set that is never refetched.
    pub fn with_keys(client_id: impl Into<String>, keys: JwkSet) -> Self {
        Self {
            client_id: client_id.into(),
            jwks_url: String::new(),
            http: reqwest::Client::new(),
            key_ttl: DEFAULT_KEY_TTL,
            cache: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: None,
            })),
            last_refresh: Mutex::new(None),
        }
    }

    async fn decoding_key(&self, kid: &str) -> AppResult<DecodingKey> {
        if let Some(found) = self.cached_key(kid, true).await {
            return found;
        }

        // One refresh at a time; waiters re-check the cache it filled.
        let mut last_refresh = self.last_refresh.lock().await;
        if let Some(found) = self.cached_key(kid, true).await {
            return found;
        }
        if last_refresh.is_some_and(|at| at.elapsed() < MIN_REFRESH_INTERVAL) {
            debug!(kid, "Signing key refresh throttled");
            return self
                .cached_key(kid, false)
                .await
                .unwrap_or_else(|| Err(unknown_key()));
        }
        *last_refresh = Some(Instant::now());

        match self.fetch_keys().await {
            Ok(keys) => {
                let key = keys
                    .find(kid)
                    .map(key_from_jwk)
                    .unwrap_or_else(|| Err(unknown_key()));
                *self.cache.write().await = Some(CachedKeys {
                    keys,
                    fetched_at: Some(Instant::now()),
                });
                key
            }
            Err(e) => {
                if let Some(found) = self.cached_key(kid, false).await {
                    warn!(error = %e, "Using stale Google signing keys");
                    return found;
                }
                if self.cache.read().await.is_some() {
                    warn!(error = %e, kid, "Signing key refresh failed");
                    return Err(unknown_key());
                }
                Err(e)
            }
        }
    }

    /// Looks `kid` up in the cache. `None` means a refresh could help.
    async fn cached_key(&self, kid: &str, fresh_only: bool) -> Option<AppResult<DecodingKey>> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        if fresh_only && !cached.is_fresh(self.key_ttl) {
            return None;
        }
        if let Some(jwk) = cached.keys.find(kid) {
            return Some(key_from_jwk(jwk));
        }
        // Statically provided keys are never refetched.
        cached.fetched_at.is_none().then(|| Err(unknown_key()))
    }

    async fn fetch_keys(&self) -> AppResult<JwkSet> {
        debug!(url = %self.jwks_url, "Fetching Google signing keys");
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Failed to fetch Google signing keys",
                    e,
                )
            })?;
        response.json::<JwkSet>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Invalid Google signing key set",
                e,
            )
        })
    }
}

fn unknown_key() -> AppError {
    AppError::unauthorized("Unknown ID token signing key")
}

fn key_from_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> AppResult<DecodingKey> {
    DecodingKey::from_jwk(jwk)
        .map_err(|e| AppError::internal(format!("Unusable ID token signing key: {e}")))
}

#[async_trait]
impl IdTokenVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity> {
        if self.client_id.is_empty() {
            error!("Google client ID is not configured");
            return Err(AppError::configuration("Google client ID is not configured"));
        }

        let header = decode_header(token)
            .map_err(|e| AppError::unauthorized(format!("Invalid ID token: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(AppError::unauthorized("Invalid ID token algorithm"));
        }
        let kid = header
            .kid
            .ok_or_else(|| AppError::unauthorized("ID token has no key ID"))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.leeway = 30;

        let claims = decode::<IdTokenClaims>(token, &key, &validation)
            .map_err(|e| {
                warn!(error = %e, "Google ID token rejected");
                AppError::unauthorized("Invalid ID token")
            })?
            .claims;

        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::unauthorized("Email not found in token"))?;
        if claims.email_verified == Some(false) {
            return Err(AppError::unauthorized("Email in token is not verified"));
        }

        Ok(VerifiedIdentity {
            email,
            name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const PRIVATE_KEY: &str = include_str!("../../testdata/id_token_rsa.pem");
    const JWKS: &str = include_str!("../../testdata/id_token_jwks.json");
    const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";

    fn verifier() -> GoogleIdTokenVerifier {
        let keys: JwkSet = serde_json::from_str(JWKS).unwrap();
        GoogleIdTokenVerifier::with_keys(CLIENT_ID, keys)
    }

    fn sign(claims: serde_json::Value, kid: &str) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }

    fn claims(aud: &str, email: Option<&str>) -> serde_json::Value {
        let now = Utc::now().timestamp();
        let mut value = json!({
            "iss": "https://accounts.google.com",
            "aud": aud,
            "sub": "1234567890",
            "iat": now,
            "exp": now + 600,
            "email_verified": true,
            "name": "Ada Lovelace",
        });
        if let Some(email) = email {
            value["email"] = json!(email);
        }
        value
    }

    #[tokio::test]
    async fn test_valid_token() {
        let token = sign(claims(CLIENT_ID, Some("ada@example.org")), "test-key-1");
        let identity = verifier().verify(&token).await.unwrap();
        assert_eq!(identity.email, "ada@example.org");
        assert_eq!(identity.name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_wrong_audience_rejected() {
        let token = sign(claims("someone-else", Some("ada@example.org")), "test-key-1");
        assert!(verifier().verify(&token).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_missing_email_rejected() {
        let token = sign(claims(CLIENT_ID, None), "test-key-1");
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(err.message.contains("Email"));
    }

    #[tokio::test]
    async fn test_unknown_kid_rejected() {
        let token = sign(claims(CLIENT_ID, Some("ada@example.org")), "rotated-away");
        assert!(verifier().verify(&token).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_hmac_token_rejected() {
        let token = encode(
            &Header::default(),
            &claims(CLIENT_ID, Some("ada@example.org")),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verifier().verify(&token).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_unconfigured_client_id() {
        let keys: JwkSet = serde_json::from_str(JWKS).unwrap();
        let verifier = GoogleIdTokenVerifier::with_keys("", keys);
        let err = verifier.verify("anything").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    /// Serves the test key set at `/certs` (or 500s) and counts requests.
    async fn jwks_server(healthy: bool) -> (String, Arc<AtomicUsize>) {
        async fn certs(
            State((hits, healthy)): State<(Arc<AtomicUsize>, bool)>,
        ) -> (StatusCode, &'static str) {
            hits.fetch_add(1, Ordering::SeqCst);
            if healthy {
                (StatusCode::OK, JWKS)
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "unavailable")
            }
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/certs", get(certs))
            .with_state((hits.clone(), healthy));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/certs"), hits)
    }

    fn remote_verifier(url: String) -> GoogleIdTokenVerifier {
        let config = AuthConfig {
            google_client_id: CLIENT_ID.to_string(),
            ..AuthConfig::default()
        };
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GoogleIdTokenVerifier::new(&config, http).with_jwks_url(url)
    }

    #[tokio::test]
    async fn test_unknown_kids_share_one_fetch() {
        let (url, hits) = jwks_server(true).await;
        let verifier = remote_verifier(url);

        for i in 0..5 {
            let kid = format!("bogus-{i}");
            let token = sign(claims(CLIENT_ID, Some("ada@example.org")), &kid);
            let err = verifier.verify(&token).await.unwrap_err();
            assert!(err.is_unauthorized());
            assert!(err.message.contains("Unknown ID token signing key"));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let token = sign(claims(CLIENT_ID, Some("ada@example.org")), "test-key-1");
        let identity = verifier.verify(&token).await.unwrap();
        assert_eq!(identity.email, "ada@example.org");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried_immediately() {
        let (url, hits) = jwks_server(false).await;
        let verifier = remote_verifier(url);
        let token = sign(claims(CLIENT_ID, Some("ada@example.org")), "bogus");

        let err = verifier.verify(&token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
