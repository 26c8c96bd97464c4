//! Web session lifecycle: issuance, sliding expiration, activity
//! recording, and background cleanup.

pub mod activity;
pub mod cleanup;
pub mod manager;
pub mod store;

pub use activity::ActivityRecorder;
pub use cleanup::SessionCleanup;
pub use manager::{SessionManager, generate_session_id};
pub use store::SessionStore;
