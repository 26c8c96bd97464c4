//! # memberhub-database
//!
//! PostgreSQL connection management and repository implementations for
//! members, role assignments, sessions, and API keys.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
