//! API key handlers.
//!
//! Keys are requested with a Google ID token, then listed and revoked from
//! a web session.

use axum::Json;
use axum::extract::{Path, State};

use memberhub_core::{AppError, MemberId};

use crate::dto::request::RequestKeyRequest;
use crate::dto::response::{ApiKeySummary, ApiResponse, IssuedKeyResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{GoogleAuth, SessionAuth, ValidJson, parse_api_key_id};
use crate::state::AppState;

/// POST /request-key
pub async fn request_key(
    State(state): State<AppState>,
    auth: GoogleAuth,
    ValidJson(req): ValidJson<RequestKeyRequest>,
) -> ApiResult<Json<ApiResponse<IssuedKeyResponse>>> {
    let issued = state.api_keys.request_key(&auth.email, req.into()).await?;
    Ok(Json(ApiResponse::ok(issued.into())))
}

async fn require_key_management(state: &AppState, member_id: MemberId) -> Result<(), AppError> {
    if state.rbac.can_access_api_key_management(member_id).await {
        Ok(())
    } else {
        Err(AppError::forbidden("API key management requires R&D membership or AVP and above"))
    }
}

/// GET /api-keys
pub async fn list_keys(
    State(state): State<AppState>,
    auth: SessionAuth,
) -> ApiResult<Json<ApiResponse<Vec<ApiKeySummary>>>> {
    require_key_management(&state, auth.member_id()?).await?;

    let keys = state.api_keys.list_keys(&auth.email).await?;
    Ok(Json(ApiResponse::ok(
        keys.into_iter().map(ApiKeySummary::from).collect(),
    )))
}

/// DELETE /api-keys/{id}
pub async fn revoke_key(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    require_key_management(&state, auth.member_id()?).await?;
    let id = parse_api_key_id(&id)?;

    state.api_keys.revoke_key(id, &auth.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("API key revoked"))))
}
