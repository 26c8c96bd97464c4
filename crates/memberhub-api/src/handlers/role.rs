//! Role assignment handlers. Granting and revoking is admin-only.

use axum::Json;
use axum::extract::{Path, State};

use memberhub_core::AppError;
use memberhub_entity::role::Role;

use crate::dto::request::GrantRoleRequest;
use crate::dto::response::{ApiResponse, MessageResponse, RoleResponse};
use crate::error::ApiResult;
use crate::extractors::{SessionAuth, ValidJson, parse_member_id};
use crate::state::AppState;

/// GET /auth/members/{id}/roles
///
/// Members may list their own roles; listing anyone else's requires role
/// management rights.
pub async fn list_roles(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<RoleResponse>>>> {
    let actor = auth.member_id()?;
    let target = parse_member_id(&id)?;

    if actor != target && !state.rbac.can_manage_roles(actor).await {
        return Err(
            AppError::forbidden("Only administrators can view other members' roles").into(),
        );
    }

    let roles = state.rbac.roles_for(target).await?;
    Ok(Json(ApiResponse::ok(
        roles.into_iter().map(RoleResponse::from).collect(),
    )))
}

/// POST /auth/members/{id}/roles
pub async fn grant_role(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<GrantRoleRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    let actor = auth.member_id()?;
    let target = parse_member_id(&id)?;
    let role: Role = req.role.parse()?;

    state.rbac.grant_role(actor, target, &role).await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Role {role} granted to member {target}"
    )))))
}

/// DELETE /auth/members/{id}/roles/{role}
pub async fn revoke_role(
    State(state): State<AppState>,
    auth: SessionAuth,
    Path((id, role)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    let actor = auth.member_id()?;
    let target = parse_member_id(&id)?;
    let role: Role = role.parse()?;

    state.rbac.revoke_role(actor, target, &role).await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Role {role} revoked from member {target}"
    )))))
}
