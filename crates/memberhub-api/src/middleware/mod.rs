//! Axum middleware stack.

pub mod cors;
pub mod logging;
pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId};
