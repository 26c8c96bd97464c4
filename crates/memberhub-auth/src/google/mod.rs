//! Google identity: ID-token verification and the OAuth web login flow.

pub mod oauth;
pub mod verifier;

pub use oauth::{GoogleOAuthClient, GoogleUserInfo, LoginState, OAuthProvider};
pub use verifier::{GoogleIdTokenVerifier, IdTokenVerifier, VerifiedIdentity};
