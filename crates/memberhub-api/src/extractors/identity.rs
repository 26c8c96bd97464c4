//! Credential extractors resolving a request to an [`Identity`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use tracing::{debug, warn};

use memberhub_auth::IdTokenVerifier;
use memberhub_core::{AppError, AppResult, MemberId};
use memberhub_entity::session::short_id;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated principal of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Member ID. Only the session path knows it up front; bearer tokens
    /// carry an email that is resolved on demand.
    pub member_id: Option<MemberId>,
    /// Email of the principal.
    pub email: String,
    /// Session the request rode on, if any.
    pub session_id: Option<String>,
}

impl Identity {
    /// The member ID, or `Unauthorized` if the credential did not carry one.
    pub fn member_id(&self) -> AppResult<MemberId> {
        self.member_id
            .ok_or_else(|| AppError::unauthorized("Credential does not identify a member"))
    }
}

macro_rules! deref_identity {
    ($name:ident) => {
        impl std::ops::Deref for $name {
            type Target = Identity;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

/// Identity from the session cookie.
///
/// A valid session is slid forward once less than the threshold fraction
/// of the default duration remains, and its activity is queued for a
/// background write. Neither side effect can fail the request.
#[derive(Debug, Clone)]
pub struct SessionAuth(pub Identity);

/// Identity from an API-key bearer token. Carries the email only.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth(pub Identity);

/// Identity from a Google ID bearer token. Carries the email only.
#[derive(Debug, Clone)]
pub struct GoogleAuth(pub Identity);

deref_identity!(SessionAuth);
deref_identity!(ApiKeyAuth);
deref_identity!(GoogleAuth);

impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        let Some(found) = state.sessions.get_session(&session_id).await? else {
            debug!(session_id = %short_id(&session_id), "Invalid session");
            return Err(AppError::unauthorized("Session expired or invalid").into());
        };

        let duration = state.sessions.config().duration();
        if state.sessions.should_extend(&found.session, duration) {
            if let Err(e) = state.sessions.extend_session(&session_id, duration).await {
                warn!(
                    session_id = %short_id(&session_id),
                    error = %e,
                    "Failed to extend session"
                );
            }
        }

        state.activity.record(&session_id);

        Ok(Self(Identity {
            member_id: Some(found.session.member_id),
            email: found.email,
            session_id: Some(session_id),
        }))
    }
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        let claims = state.api_key_decoder.decode(&token)?;

        Ok(Self(Identity {
            member_id: None,
            email: claims.email,
            session_id: None,
        }))
    }
}

impl FromRequestParts<AppState> for GoogleAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        let verified = state.id_tokens.verify(&token).await?;

        Ok(Self(Identity {
            member_id: None,
            email: verified.email,
            session_id: None,
        }))
    }
}

async fn bearer_token(parts: &mut Parts, state: &AppState) -> AppResult<String> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AppError::unauthorized("Authorization header is required")
                } else {
                    AppError::unauthorized("Invalid Authorization header format")
                }
            })?;

    let token = bearer.token().trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("Invalid Authorization header format"));
    }
    Ok(token.to_string())
}
