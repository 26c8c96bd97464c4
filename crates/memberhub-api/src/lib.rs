//! # memberhub-api
//!
//! HTTP API layer for MemberHub built on Axum.
//!
//! Provides the REST endpoints, the three credential extractors (session
//! cookie, API-key bearer token, Google ID token), request middleware,
//! DTOs, and error mapping.

pub mod app;
pub mod cookie;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::{AppState, Backends};
