// Role management endpoints

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::role::{RoleChangeRequest, RoleName},
    services::roles::RoleService,
};

/// Assign a role to a user (admin)
/// POST /api/v1/roles/assign
#[utoipa::path(
    post,
    path = "/v1/roles/assign",
    tag = "Roles",
    operation_id = "assignRole",
    request_body = RoleChangeRequest,
    responses(
        (status = 201, description = "Role assigned"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "User already holds the role")
    ),
    security(("bearerAuth" = []))
)]
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<RoleChangeRequest>,
) -> impl IntoResponse {
    let service = RoleService::new(&state);
    if let Err(e) = service
        .require_role(auth_user.user_id, RoleName::Admin)
        .await
    {
        return e.into_response();
    }

    match service.assign_role(request.user_id, request.role).await {
        Ok(()) => (StatusCode::CREATED, Json(json!({ "success": true }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a role from a user (admin)
/// POST /api/v1/roles/remove
#[utoipa::path(
    post,
    path = "/v1/roles/remove",
    tag = "Roles",
    operation_id = "removeRole",
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role removed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User does not hold the role")
    ),
    security(("bearerAuth" = []))
)]
pub async fn remove_role(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<RoleChangeRequest>,
) -> impl IntoResponse {
    let service = RoleService::new(&state);
    if let Err(e) = service
        .require_role(auth_user.user_id, RoleName::Admin)
        .await
    {
        return e.into_response();
    }

    match service.remove_role(request.user_id, request.role).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Current user's role names
/// GET /api/v1/roles/me
#[utoipa::path(
    get,
    path = "/v1/roles/me",
    tag = "Roles",
    operation_id = "myRoles",
    responses(
        (status = 200, description = "Role names for the current user"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearerAuth" = []))
)]
pub async fn my_roles(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    let service = RoleService::new(&state);
    match service.get_user_roles(auth_user.user_id).await {
        Ok(roles) => Json(json!({ "roles": roles })).into_response(),
        Err(e) => e.into_response(),
    }
}
