//! Web login handlers: Google OAuth, logout, and the current member.
//!
//! Callback failures never answer with an error body. The browser is sent
//! back to the frontend login page with an `error` code instead.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{LOCATION, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use memberhub_auth::{LoginState, MemberDirectory, OAuthProvider};
use memberhub_core::AppError;

use crate::cookie::{clear_session_cookie, session_cookie};
use crate::dto::request::{CallbackQuery, LoginQuery};
use crate::dto::response::{ApiResponse, MemberResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::SessionAuth;
use crate::state::AppState;

/// 302 Found to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn login_error(state: &AppState, code: &str) -> Response {
    found(&format!(
        "{}/login?error={code}",
        state.config.server.frontend_url()
    ))
}

/// Best-effort client address from proxy headers.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /auth/google/login
pub async fn google_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> ApiResult<Response> {
    let login = LoginState::new(
        query.remember.as_deref() == Some("true"),
        query.redirect.as_deref(),
    );
    let url = state.oauth.authorization_url(&login)?;
    Ok(found(&url))
}

/// GET /auth/google/callback
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if let Some(denied) = query.error.as_deref() {
        error!(error = %denied, "OAuth error from Google");
        return login_error(&state, "oauth_denied");
    }
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return login_error(&state, "no_code");
    };
    let login = LoginState::parse(query.state.as_deref().unwrap_or_default());

    let access_token = match state.oauth.exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to exchange code for token");
            return login_error(&state, "token_exchange");
        }
    };

    let profile = match state.oauth.user_info(&access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, "Failed to get user info");
            return login_error(&state, "user_info");
        }
    };

    let member = match state.members.find_by_email(&profile.email).await {
        Ok(Some(member)) => member,
        Ok(None) => {
            warn!(email = %profile.email, "Non-member attempted login");
            return login_error(&state, "not_member");
        }
        Err(e) => {
            error!(error = %e, "Failed to check member status");
            return login_error(&state, "db_error");
        }
    };

    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let ip = client_ip(&headers);
    let session = match state
        .sessions
        .create_session(member.id, login.remember_me, user_agent, ip.as_deref())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            error!(member_id = %member.id, error = %e, "Failed to create session");
            return login_error(&state, "session_create");
        }
    };

    info!(
        member_id = %member.id,
        email = %member.email,
        remember_me = login.remember_me,
        "Member logged in"
    );

    let max_age = state.sessions.duration_for(login.remember_me);
    let jar = jar.add(session_cookie(&state.config, session.id, max_age));
    let target = format!(
        "{}{}",
        state.config.server.frontend_url(),
        login.redirect.as_deref().unwrap_or_default()
    );
    (jar, found(&target)).into_response()
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    let session_id = jar
        .get(&state.config.session.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    let Some(session_id) = session_id else {
        return (jar, Json(ApiResponse::ok(MessageResponse::new("Already logged out"))));
    };

    if let Err(e) = state.sessions.delete_session(&session_id).await {
        error!(error = %e, "Failed to delete session");
    }

    (
        jar.add(clear_session_cookie(&state.config)),
        Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))),
    )
}

/// POST /auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: SessionAuth,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<ApiResponse<MessageResponse>>)> {
    let member_id = auth.member_id()?;
    let ended = state.sessions.delete_all_for_member(member_id).await?;

    Ok((
        jar.add(clear_session_cookie(&state.config)),
        Json(ApiResponse::ok(MessageResponse::new(format!(
            "Logged out of {ended} session(s)"
        )))),
    ))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: SessionAuth,
) -> ApiResult<Json<ApiResponse<MemberResponse>>> {
    let member_id = auth.member_id()?;
    let member = state
        .members
        .find_profile(member_id)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;

    Ok(Json(ApiResponse::ok(member.into())))
}
