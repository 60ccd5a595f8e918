//! Tool registry endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::history::HistoryEntry,
    models::tool::{CreateTool, Tool, ToolDetails, UpdateTool},
};

use super::{AuthenticatedUser, MessageResponse};

#[derive(Serialize, ToSchema)]
pub struct ToolListResponse {
    pub success: bool,
    pub tools: Vec<ToolDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct ToolResponse {
    pub success: bool,
    pub tool: ToolDetails,
}

#[derive(Serialize, ToSchema)]
pub struct ToolCreatedResponse {
    pub success: bool,
    pub message: String,
    pub tool: Tool,
}

#[derive(Serialize, ToSchema)]
pub struct ToolHistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryEntry>,
}

/// List all tools
#[utoipa::path(
    get,
    path = "/tools",
    tag = "tools",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tool list", body = ToolListResponse)
    )
)]
pub async fn list_tools(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ToolListResponse>> {
    let tools = state.services.tools.list().await?;
    Ok(Json(ToolListResponse {
        success: true,
        tools,
    }))
}

/// Get a tool by id
#[utoipa::path(
    get,
    path = "/tools/{id}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Tool", body = ToolResponse),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn get_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToolResponse>> {
    let tool = state.services.tools.get(id).await?;
    Ok(Json(ToolResponse {
        success: true,
        tool,
    }))
}

/// Look up a tool by its scan code
#[utoipa::path(
    get,
    path = "/tools/qr/{code}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "QR code")),
    responses(
        (status = 200, description = "Tool", body = ToolResponse),
        (status = 404, description = "No tool with this code")
    )
)]
pub async fn get_tool_by_qr(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<Json<ToolResponse>> {
    let tool = state.services.tools.get_by_qr(&code).await?;
    Ok(Json(ToolResponse {
        success: true,
        tool,
    }))
}

/// Register a new tool
#[utoipa::path(
    post,
    path = "/tools",
    tag = "tools",
    security(("bearer_auth" = [])),
    request_body = CreateTool,
    responses(
        (status = 201, description = "Tool created", body = ToolCreatedResponse),
        (status = 400, description = "Missing fields or duplicate QR code"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateTool>,
) -> AppResult<(StatusCode, Json<ToolCreatedResponse>)> {
    claims.require_admin()?;
    let tool = state.services.tools.create(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ToolCreatedResponse {
            success: true,
            message: "Tool created".to_string(),
            tool,
        }),
    ))
}

/// Update a tool
#[utoipa::path(
    put,
    path = "/tools/{id}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    request_body = UpdateTool,
    responses(
        (status = 200, description = "Tool updated", body = ToolResponse),
        (status = 400, description = "Invalid update or tool on loan"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn update_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTool>,
) -> AppResult<Json<ToolResponse>> {
    claims.require_admin()?;
    let tool = state.services.tools.update(id, &request).await?;
    Ok(Json(ToolResponse {
        success: true,
        tool,
    }))
}

/// Delete a tool
#[utoipa::path(
    delete,
    path = "/tools/{id}",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "Tool deleted", body = MessageResponse),
        (status = 400, description = "Tool on loan or not in a deletable state"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn delete_tool(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_admin()?;
    state.services.tools.delete(id, claims.user_id).await?;
    Ok(Json(MessageResponse::ok("Tool deleted")))
}

/// Audit history for a tool
#[utoipa::path(
    get,
    path = "/tools/{id}/history",
    tag = "tools",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Tool ID")),
    responses(
        (status = 200, description = "History entries", body = ToolHistoryResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn tool_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToolHistoryResponse>> {
    claims.require_admin()?;
    let history = state.services.tools.history(id).await?;
    Ok(Json(ToolHistoryResponse {
        success: true,
        history,
    }))
}
