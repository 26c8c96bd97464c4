//! The API key request flow.
//!
//! A requester authenticated by a Google ID token asks for a key on behalf
//! of a member. Admin keys are not origin-bound and never expire. Dev keys
//! must name a localhost origin, which is not recorded. Prod keys are bound
//! to a unique public origin. Only the SHA-256 of the token is stored; the
//! raw token is handed back exactly once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use url::Url;

use memberhub_core::{ApiKeyId, AppError, AppResult};
use memberhub_entity::api_key::{ApiKey, KeyType, NewApiKey};

use crate::directory::MemberDirectory;
use crate::jwt::{ApiKeyIssuer, hash_token};
use crate::rbac::RbacService;

use super::store::ApiKeyStore;

const LOCALHOST_PREFIX: &str = "http://localhost";

/// Parameters of a key request.
#[derive(Debug, Clone, Default)]
pub struct KeyRequest {
    /// Member the key is issued for.
    pub email: String,
    /// Optional project label.
    pub project: Option<String>,
    /// Origin the key will be used from.
    pub allowed_origin: Option<String>,
    /// Request a dev key.
    pub is_dev: bool,
    /// Request an admin key. Wins over `is_dev`.
    pub is_admin: bool,
}

/// A freshly issued key. `api_key` is the only copy of the raw token.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedApiKey {
    /// Email of the owning member.
    pub email: String,
    /// The raw token.
    pub api_key: String,
    /// When the token stops validating, if ever.
    pub expires_at: Option<DateTime<Utc>>,
    /// The stored record.
    #[serde(skip)]
    pub record: ApiKey,
}

/// Issues, lists and revokes API keys.
#[derive(Clone)]
pub struct ApiKeyService {
    rbac: RbacService,
    members: Arc<dyn MemberDirectory>,
    store: Arc<dyn ApiKeyStore>,
    issuer: ApiKeyIssuer,
}

impl std::fmt::Debug for ApiKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyService")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl ApiKeyService {
    /// Creates a new service.
    pub fn new(
        rbac: RbacService,
        members: Arc<dyn MemberDirectory>,
        store: Arc<dyn ApiKeyStore>,
        issuer: ApiKeyIssuer,
    ) -> Self {
        Self {
            rbac,
            members,
            store,
            issuer,
        }
    }

    /// Issues a key for `request.email` on behalf of `requester`.
    pub async fn request_key(&self, requester: &str, request: KeyRequest) -> AppResult<IssuedApiKey> {
        if !self.rbac.can_access_api_by_email(requester).await {
            return Err(AppError::forbidden(
                "Not allowed to request API keys",
            ));
        }

        let member = self
            .members
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::not_found("Not a member"))?;

        let key_type = KeyType::from_flags(request.is_dev, request.is_admin);
        let origin = self
            .bound_origin(key_type, request.allowed_origin.as_deref())
            .await?;

        let (token, expires_at) = self.issuer.issue(&member.email, key_type)?;
        let record = self
            .store
            .store(&NewApiKey {
                member_email: member.email.clone(),
                api_key_hash: hash_token(&token),
                project: request.project.filter(|p| !p.is_empty()),
                allowed_origin: origin,
                key_type,
                expires_at,
            })
            .await?;

        info!(
            requester = %requester,
            email = %member.email,
            key_id = %record.api_key_id,
            key_type = %key_type,
            "API key issued"
        );

        Ok(IssuedApiKey {
            email: member.email,
            api_key: token,
            expires_at,
            record,
        })
    }

    /// Keys owned by `email`, newest first.
    pub async fn list_keys(&self, email: &str) -> AppResult<Vec<ApiKey>> {
        self.store.list_for_email(email).await
    }

    /// Revokes key `id` if `email` owns it.
    pub async fn revoke_key(&self, id: ApiKeyId, email: &str) -> AppResult<()> {
        if self.store.revoke(id, email).await? {
            info!(key_id = %id, email = %email, "API key revoked");
            Ok(())
        } else {
            Err(AppError::not_found(format!("API key {id} not found")))
        }
    }

    /// The origin to record for a new key of `key_type`.
    async fn bound_origin(
        &self,
        key_type: KeyType,
        origin: Option<&str>,
    ) -> AppResult<Option<String>> {
        let origin = origin.unwrap_or_default();
        match key_type {
            KeyType::Admin => Ok(None),
            KeyType::Dev => {
                if origin.starts_with(LOCALHOST_PREFIX) {
                    Ok(None)
                } else {
                    Err(AppError::validation(
                        "For dev keys, allowed_origin must start with http://localhost",
                    ))
                }
            }
            KeyType::Prod => {
                if origin.is_empty() {
                    return Err(AppError::validation(
                        "allowed_origin is required for production keys",
                    ));
                }
                let url = Url::parse(origin)
                    .map_err(|_| AppError::validation("Invalid URL for allowed_origin"))?;
                if !url.has_host() {
                    return Err(AppError::validation("Invalid URL for allowed_origin"));
                }
                if origin.starts_with(LOCALHOST_PREFIX) || url.host_str() == Some("localhost") {
                    return Err(AppError::validation(
                        "localhost is not a valid origin for production keys",
                    ));
                }
                if self.store.origin_exists(origin).await? {
                    return Err(AppError::conflict(format!(
                        "API key for origin {origin} already exists"
                    )));
                }
                Ok(Some(origin.to_string()))
            }
        }
    }
}
