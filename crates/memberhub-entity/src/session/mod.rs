//! Web session entities.

pub mod model;

pub use model::{NewSession, SESSION_ID_LEN, Session, SessionWithMember, short_id};
