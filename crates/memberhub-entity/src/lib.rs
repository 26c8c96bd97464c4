//! # memberhub-entity
//!
//! Domain entity models for MemberHub. Structs here are either database
//! rows (deriving `sqlx::FromRow`) or domain value objects such as
//! [`member::Position`] and [`member::EditableField`].

pub mod api_key;
pub mod member;
pub mod role;
pub mod session;
