//! # memberhub-auth
//!
//! Authentication and authorization core for MemberHub.
//!
//! ## Modules
//!
//! - `rbac`: position hierarchy and the RBAC evaluator
//! - `jwt`: API-key token issuance and verification
//! - `session`: opaque web sessions with sliding expiration and cleanup
//! - `google`: Google ID-token verification and the OAuth web flow
//! - `apikey`: API-key request, listing, and revocation
//! - `directory`: member and role collaborator traits
//! - `memory`: in-memory collaborators for single-node use and tests

pub mod apikey;
pub mod directory;
pub mod google;
pub mod jwt;
pub mod memory;
pub mod rbac;
pub mod session;

pub use apikey::{ApiKeyService, ApiKeyStore, IssuedApiKey, KeyRequest};
pub use directory::{MemberDirectory, RoleStore};
pub use google::{
    GoogleIdTokenVerifier, GoogleOAuthClient, IdTokenVerifier, LoginState, OAuthProvider,
    VerifiedIdentity,
};
pub use jwt::{ApiKeyClaims, ApiKeyDecoder, ApiKeyIssuer};
pub use rbac::RbacService;
pub use session::{ActivityRecorder, SessionCleanup, SessionManager, SessionStore};
