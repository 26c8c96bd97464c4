//! Explicit role assignments.

pub mod model;

pub use model::{Role, RoleAssignment};
