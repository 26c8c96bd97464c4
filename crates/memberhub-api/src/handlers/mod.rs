//! HTTP request handlers organized by domain.

pub mod api_key;
pub mod auth;
pub mod health;
pub mod member;
pub mod role;
