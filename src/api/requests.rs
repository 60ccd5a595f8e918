//! Borrow request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::enums::RequestState,
    models::request::{CreateRequest, RequestDetails, ReviewRequest},
};

use super::{AuthenticatedUser, MessageResponse};

#[derive(Deserialize, ToSchema)]
pub struct RequestListQuery {
    pub state: Option<RequestState>,
}

#[derive(Serialize, ToSchema)]
pub struct RequestListResponse {
    pub success: bool,
    pub requests: Vec<RequestDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct RequestResponse {
    pub success: bool,
    pub message: String,
    pub request: RequestDetails,
}

#[derive(Serialize, ToSchema)]
pub struct ApproveResponse {
    pub success: bool,
    pub message: String,
    pub loan_id: i32,
}

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request submitted", body = RequestResponse),
        (status = 400, description = "Invalid dates or duplicate pending request"),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestResponse>)> {
    let id = state
        .services
        .requests
        .create(claims.user_id, &request)
        .await?;
    let details = state.services.requests.get(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            success: true,
            message: "Request submitted".to_string(),
            request: details,
        }),
    ))
}

/// List the caller's requests
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's requests", body = RequestListResponse)
    )
)]
pub async fn list_my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RequestListResponse>> {
    let requests = state.services.requests.list_for_user(claims.user_id).await?;
    Ok(Json(RequestListResponse {
        success: true,
        requests,
    }))
}

/// List all requests, optionally filtered by state
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("state" = Option<RequestState>, Query, description = "Filter by state")),
    responses(
        (status = 200, description = "Requests", body = RequestListResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<RequestListResponse>> {
    claims.require_admin()?;
    let requests = state.services.requests.list(query.state).await?;
    Ok(Json(RequestListResponse {
        success: true,
        requests,
    }))
}

/// Approve a pending request, opening a loan
#[utoipa::path(
    put,
    path = "/requests/{id}/approve",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Request approved", body = ApproveResponse),
        (status = 400, description = "Request already reviewed or tool not available"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(review): Json<ReviewRequest>,
) -> AppResult<Json<ApproveResponse>> {
    claims.require_admin()?;
    let loan_id = state
        .services
        .requests
        .approve(id, claims.user_id, review.comment.as_deref())
        .await?;
    Ok(Json(ApproveResponse {
        success: true,
        message: "Request approved, loan created".to_string(),
        loan_id,
    }))
}

/// Reject a pending request
#[utoipa::path(
    put,
    path = "/requests/{id}/reject",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Request rejected", body = MessageResponse),
        (status = 400, description = "Missing comment or request already reviewed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(review): Json<ReviewRequest>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_admin()?;
    state
        .services
        .requests
        .reject(id, claims.user_id, review.comment.as_deref())
        .await?;
    Ok(Json(MessageResponse::ok("Request rejected")))
}

/// Cancel one of the caller's pending requests
#[utoipa::path(
    put,
    path = "/requests/{id}/cancel",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = MessageResponse),
        (status = 400, description = "Request already reviewed"),
        (status = 403, description = "Not the request owner"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn cancel_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.requests.cancel(id, claims.user_id).await?;
    Ok(Json(MessageResponse::ok("Request cancelled")))
}
