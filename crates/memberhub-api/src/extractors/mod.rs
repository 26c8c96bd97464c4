//! Custom Axum extractors.
//!
//! Each credential form has its own extractor; an endpoint accepts exactly
//! the one it names and never falls back to another.

pub mod identity;
pub mod json;
pub mod path;

pub use identity::{ApiKeyAuth, GoogleAuth, Identity, SessionAuth};
pub use json::ValidJson;
pub use path::{parse_api_key_id, parse_member_id};
