//! Member read handlers.

use axum::Json;
use axum::extract::{Path, State};

use memberhub_auth::MemberDirectory;
use memberhub_core::AppError;

use crate::dto::response::{ApiResponse, EditableFieldsResponse, MemberResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiKeyAuth, SessionAuth, parse_member_id};
use crate::state::AppState;

/// GET /auth/members/{id}
pub async fn get_member(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MemberResponse>>> {
    let actor = auth.member_id()?;
    let target = parse_member_id(&id)?;

    if !state.rbac.can_view_member(actor, target).await {
        return Err(AppError::forbidden("Not allowed to view this member").into());
    }

    let member = state
        .members
        .find_profile(target)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;

    Ok(Json(ApiResponse::ok(member.into())))
}

/// GET /auth/members/{id}/editable-fields
pub async fn editable_fields(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<EditableFieldsResponse>>> {
    let actor = auth.member_id()?;
    let target = parse_member_id(&id)?;

    let fields = state
        .rbac
        .get_editable_fields(actor, target)
        .await
        .into_iter()
        .map(|f| f.as_str().to_string())
        .collect();

    Ok(Json(ApiResponse::ok(EditableFieldsResponse {
        member_id: target,
        fields,
    })))
}

/// GET /members/me
///
/// API-key protected. The key's email must still belong to a member with
/// API access.
pub async fn api_me(
    State(state): State<AppState>,
    auth: ApiKeyAuth,
) -> ApiResult<Json<ApiResponse<MemberResponse>>> {
    if !state.rbac.can_access_api_by_email(&auth.email).await {
        return Err(AppError::forbidden("Insufficient privileges").into());
    }

    let info = state
        .members
        .find_by_email(&auth.email)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;
    let member = state
        .members
        .find_profile(info.id)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;

    Ok(Json(ApiResponse::ok(member.into())))
}
