//! API key issuance, listing and revocation.

pub mod service;
pub mod store;

pub use service::{ApiKeyService, IssuedApiKey, KeyRequest};
pub use store::ApiKeyStore;
