//! API-key token issuance and verification.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::ApiKeyClaims;
pub use decoder::ApiKeyDecoder;
pub use encoder::ApiKeyIssuer;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a token. Only this digest is ever persisted.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
