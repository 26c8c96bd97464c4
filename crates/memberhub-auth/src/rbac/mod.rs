//! Position hierarchy and role-based access control.

pub mod hierarchy;
pub mod service;

pub use hierarchy::{higher, higher_or_equal, level};
pub use service::RbacService;
