//! Admin user management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::enums::Role,
    models::user::{CreateUser, UpdateUser, UserPublic},
};

use super::{AuthenticatedUser, MessageResponse};

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserPublic>,
}

#[derive(Serialize, ToSchema)]
pub struct UserDetailResponse {
    pub success: bool,
    pub user: UserPublic,
}

#[derive(Deserialize, ToSchema)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserListResponse>> {
    claims.require_admin()?;
    let users = state.services.users.list().await?;
    Ok(Json(UserListResponse {
        success: true,
        users,
    }))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserDetailResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserDetailResponse>> {
    claims.require_admin()?;
    let user = state.services.users.get(id).await?;
    Ok(Json(UserDetailResponse {
        success: true,
        user,
    }))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserDetailResponse),
        (status = 400, description = "Invalid input or email registered"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserDetailResponse>)> {
    claims.require_admin()?;
    let user = state.services.users.create(claims.user_id, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserDetailResponse {
            success: true,
            user,
        }),
    ))
}

/// Update a user account
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserDetailResponse),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<UserDetailResponse>> {
    claims.require_admin()?;
    let user = state
        .services
        .users
        .update(claims.user_id, id, &request)
        .await?;
    Ok(Json(UserDetailResponse {
        success: true,
        user,
    }))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserDetailResponse),
        (status = 400, description = "Cannot change own role"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_user_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<SetRoleRequest>,
) -> AppResult<Json<UserDetailResponse>> {
    claims.require_admin()?;
    let user = state
        .services
        .users
        .set_role(claims.user_id, id, request.role)
        .await?;
    Ok(Json(UserDetailResponse {
        success: true,
        user,
    }))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Own account or user has active loans"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_admin()?;
    state.services.users.delete(claims.user_id, id).await?;
    Ok(Json(MessageResponse::ok("User deleted")))
}
