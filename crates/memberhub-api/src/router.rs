//! Route definitions for the MemberHub HTTP API.
//!
//! Each group names the credential its handlers accept: the `/auth` web
//! routes ride on the session cookie, `/request-key` on a Google ID token,
//! and `/members/me` on an API key.

use axum::Router;
use axum::routing::{delete, get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, without middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes())
        .merge(session_routes())
        .merge(api_key_routes())
        .merge(integration_routes())
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Public login and logout.
fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/google/login", get(handlers::auth::google_login))
        .route("/auth/google/callback", get(handlers::auth::google_callback))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// Session-protected web UI routes.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/logout-all", post(handlers::auth::logout_all))
        .route("/auth/members/{id}", get(handlers::member::get_member))
        .route(
            "/auth/members/{id}/editable-fields",
            get(handlers::member::editable_fields),
        )
        .route(
            "/auth/members/{id}/roles",
            get(handlers::role::list_roles).post(handlers::role::grant_role),
        )
        .route(
            "/auth/members/{id}/roles/{role}",
            delete(handlers::role::revoke_role),
        )
}

/// API key issuance (Google ID token) and management (session).
fn api_key_routes() -> Router<AppState> {
    Router::new()
        .route("/request-key", post(handlers::api_key::request_key))
        .route("/api-keys", get(handlers::api_key::list_keys))
        .route("/api-keys/{id}", delete(handlers::api_key::revoke_key))
}

/// Routes for external integrations holding an API key.
fn integration_routes() -> Router<AppState> {
    Router::new().route("/members/me", get(handlers::member::api_me))
}
