//! API key persistence contract.

use async_trait::async_trait;

use memberhub_core::{ApiKeyId, AppResult};
use memberhub_database::repositories::ApiKeyRepository;
use memberhub_entity::api_key::{ApiKey, NewApiKey};

/// Storage of issued API key hashes.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Store a newly issued key.
    async fn store(&self, key: &NewApiKey) -> AppResult<ApiKey>;

    /// Check whether a key is already bound to `origin`.
    async fn origin_exists(&self, origin: &str) -> AppResult<bool>;

    /// List keys owned by `email`.
    async fn list_for_email(&self, email: &str) -> AppResult<Vec<ApiKey>>;

    /// Delete key `id` if it is owned by `email`. Returns `true` on delete.
    async fn revoke(&self, id: ApiKeyId, email: &str) -> AppResult<bool>;
}

#[async_trait]
impl ApiKeyStore for ApiKeyRepository {
    async fn store(&self, key: &NewApiKey) -> AppResult<ApiKey> {
        self.create(key).await
    }

    async fn origin_exists(&self, origin: &str) -> AppResult<bool> {
        ApiKeyRepository::origin_exists(self, origin).await
    }

    async fn list_for_email(&self, email: &str) -> AppResult<Vec<ApiKey>> {
        self.find_by_email(email).await
    }

    async fn revoke(&self, id: ApiKeyId, email: &str) -> AppResult<bool> {
        self.delete_owned(id, email).await
    }
}
