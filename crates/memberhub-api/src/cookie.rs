//! The session cookie.

use axum_extra::extract::cookie::{Cookie, SameSite};

use memberhub_core::config::AppConfig;

/// Cookie carrying `session_id` for `max_age`.
pub fn session_cookie(
    config: &AppConfig,
    session_id: String,
    max_age: chrono::Duration,
) -> Cookie<'static> {
    Cookie::build((config.session.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Cookie that makes the browser drop the session cookie immediately.
pub fn clear_session_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((config.session.cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}
