//! Repository implementations for MemberHub entities.

pub mod api_key;
pub mod member;
pub mod role;
pub mod session;

pub use api_key::ApiKeyRepository;
pub use member::MemberRepository;
pub use role::RoleRepository;
pub use session::SessionRepository;
