//! Google OAuth 2.0 authorization-code flow for web login.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use memberhub_core::config::AuthConfig;
use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::AppResult;

/// Google's consent screen.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google's userinfo endpoint.
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Login options carried through the OAuth `state` parameter as
/// `"{remember}|{redirect}"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    /// Whether to issue a long-lived session.
    pub remember_me: bool,
    /// Frontend path to land on after login.
    pub redirect: Option<String>,
}

impl LoginState {
    /// Creates a state, dropping redirects that are not same-site paths.
    pub fn new(remember_me: bool, redirect: Option<&str>) -> Self {
        Self {
            remember_me,
            redirect: redirect.filter(|r| is_safe_path(r)).map(String::from),
        }
    }

    /// Encodes the state for the OAuth round trip.
    pub fn encode(&self) -> String {
        format!(
            "{}|{}",
            self.remember_me,
            self.redirect.as_deref().unwrap_or_default()
        )
    }

    /// Parses a returned state. Anything unparseable yields the defaults.
    pub fn parse(state: &str) -> Self {
        let mut parts = state.splitn(2, '|');
        let remember_me = parts.next() == Some("true");
        Self::new(remember_me, parts.next().filter(|r| !r.is_empty()))
    }
}

fn is_safe_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

/// Profile returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    /// Google account ID.
    #[serde(default)]
    pub id: String,
    /// Account email.
    pub email: String,
    /// Whether Google verified the email.
    #[serde(default)]
    pub verified_email: bool,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The provider side of the authorization-code flow.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL of the consent screen for `state`.
    fn authorization_url(&self, state: &LoginState) -> AppResult<String>;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> AppResult<String>;

    /// Fetch the account profile for an access token.
    async fn user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo>;
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for GoogleOAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthClient")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

impl GoogleOAuthClient {
    /// Creates a client from auth configuration.
    pub fn new(config: &AuthConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.oauth_redirect_url.clone(),
            http,
        }
    }
}

fn external(message: &'static str) -> impl FnOnce(reqwest::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::ExternalService, message, e)
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &LoginState) -> AppResult<String> {
        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("state", state.encode().as_str()),
                ("access_type", "online"),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AppError::internal(format!("Failed to build authorization URL: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(external("Token exchange failed"))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(external("Invalid token response"))?;
        Ok(token.access_token)
    }

    async fn user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo> {
        self.http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(external("Userinfo request failed"))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(external("Invalid userinfo response"))
    }
}
