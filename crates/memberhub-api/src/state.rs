//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use memberhub_auth::{
    ActivityRecorder, ApiKeyDecoder, ApiKeyIssuer, ApiKeyService, ApiKeyStore, IdTokenVerifier,
    MemberDirectory, OAuthProvider, RbacService, RoleStore, SessionManager, SessionStore,
};
use memberhub_core::config::AppConfig;

/// Storage collaborators behind the services.
///
/// Production wires the sqlx repositories; tests wire `memberhub_auth::memory`.
#[derive(Clone)]
pub struct Backends {
    /// Member directory.
    pub members: Arc<dyn MemberDirectory>,
    /// Role assignments.
    pub roles: Arc<dyn RoleStore>,
    /// Session rows.
    pub sessions: Arc<dyn SessionStore>,
    /// API key hashes.
    pub api_keys: Arc<dyn ApiKeyStore>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Member directory
    pub members: Arc<dyn MemberDirectory>,
    /// Authorization decisions
    pub rbac: RbacService,
    /// Session lifecycle
    pub sessions: SessionManager,
    /// Background activity writer
    pub activity: ActivityRecorder,
    /// API-key token validation
    pub api_key_decoder: ApiKeyDecoder,
    /// API-key issuance and revocation
    pub api_keys: ApiKeyService,
    /// Google ID token verification
    pub id_tokens: Arc<dyn IdTokenVerifier>,
    /// Google OAuth web login
    pub oauth: Arc<dyn OAuthProvider>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .finish()
    }
}

impl AppState {
    /// Wires the services over `backends`.
    ///
    /// `activity` must drain into the same session store as
    /// `backends.sessions`.
    pub fn new(
        config: Arc<AppConfig>,
        backends: Backends,
        activity: ActivityRecorder,
        id_tokens: Arc<dyn IdTokenVerifier>,
        oauth: Arc<dyn OAuthProvider>,
    ) -> Self {
        let rbac = RbacService::new(Arc::clone(&backends.members), backends.roles);
        let sessions = SessionManager::new(backends.sessions, config.session.clone());
        let api_keys = ApiKeyService::new(
            rbac.clone(),
            Arc::clone(&backends.members),
            backends.api_keys,
            ApiKeyIssuer::new(&config.auth),
        );

        Self {
            api_key_decoder: ApiKeyDecoder::new(&config.auth),
            members: backends.members,
            rbac,
            sessions,
            activity,
            api_keys,
            id_tokens,
            oauth,
            config,
        }
    }
}
