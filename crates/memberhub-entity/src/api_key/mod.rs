//! API key records and key types.

pub mod model;

pub use model::{ApiKey, KeyType, NewApiKey};
