//! Return review endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::enums::ReturnState,
    models::loan::LoanDetails,
    models::tool_return::{ApproveReturn, CreateReturn, RejectReturn, ReturnDetails},
};

use super::AuthenticatedUser;

#[derive(Deserialize, ToSchema)]
pub struct ReturnListQuery {
    pub state: Option<ReturnState>,
}

#[derive(Serialize, ToSchema)]
pub struct ReturnListResponse {
    pub success: bool,
    pub returns: Vec<ReturnDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub success: bool,
    pub message: String,
    pub submission: ReturnDetails,
}

#[derive(Serialize, ToSchema)]
pub struct LoanByQrResponse {
    pub success: bool,
    pub loan: LoanDetails,
}

/// Submit a return for review
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    request_body = CreateReturn,
    responses(
        (status = 201, description = "Return submitted", body = ReturnResponse),
        (status = 400, description = "Scanned tool mismatch or pending return exists"),
        (status = 404, description = "Loan not found or already returned")
    )
)]
pub async fn submit_return(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReturn>,
) -> AppResult<(StatusCode, Json<ReturnResponse>)> {
    let submission = state
        .services
        .returns
        .submit(claims.user_id, &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ReturnResponse {
            success: true,
            message: "Return submitted for review".to_string(),
            submission,
        }),
    ))
}

/// List the caller's return submissions
#[utoipa::path(
    get,
    path = "/returns/mine",
    tag = "returns",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's returns", body = ReturnListResponse)
    )
)]
pub async fn list_my_returns(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ReturnListResponse>> {
    let returns = state.services.returns.list_for_user(claims.user_id).await?;
    Ok(Json(ReturnListResponse {
        success: true,
        returns,
    }))
}

/// List all return submissions, optionally filtered by state
#[utoipa::path(
    get,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(("state" = Option<ReturnState>, Query, description = "Filter by state")),
    responses(
        (status = 200, description = "Returns", body = ReturnListResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_returns(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReturnListQuery>,
) -> AppResult<Json<ReturnListResponse>> {
    claims.require_admin()?;
    let returns = state.services.returns.list(query.state).await?;
    Ok(Json(ReturnListResponse {
        success: true,
        returns,
    }))
}

/// Resolve the caller's active loan for a scanned tool code
#[utoipa::path(
    get,
    path = "/returns/loan-by-qr/{code}",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "QR code")),
    responses(
        (status = 200, description = "Matching active loan", body = LoanByQrResponse),
        (status = 404, description = "No active loan of the caller matches this code")
    )
)]
pub async fn loan_by_qr(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<Json<LoanByQrResponse>> {
    let loan = state
        .services
        .loans
        .active_for_qr(&code, claims.user_id)
        .await?;
    Ok(Json(LoanByQrResponse {
        success: true,
        loan,
    }))
}

/// Approve a pending return, closing the loan
#[utoipa::path(
    put,
    path = "/returns/{id}/approve",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Return ID")),
    request_body = ApproveReturn,
    responses(
        (status = 200, description = "Return approved", body = ReturnResponse),
        (status = 400, description = "Invalid tool state or return already reviewed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Return not found")
    )
)]
pub async fn approve_return(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ApproveReturn>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_admin()?;
    let submission = state
        .services
        .returns
        .approve(
            id,
            claims.user_id,
            request.new_tool_state,
            request.admin_notes.as_deref(),
        )
        .await?;
    Ok(Json(ReturnResponse {
        success: true,
        message: "Return approved".to_string(),
        submission,
    }))
}

/// Reject a pending return, leaving the loan active
#[utoipa::path(
    put,
    path = "/returns/{id}/reject",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Return ID")),
    request_body = RejectReturn,
    responses(
        (status = 200, description = "Return rejected", body = ReturnResponse),
        (status = 400, description = "Missing notes or return already reviewed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Return not found")
    )
)]
pub async fn reject_return(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<RejectReturn>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_admin()?;
    let submission = state
        .services
        .returns
        .reject(id, claims.user_id, &request.admin_notes)
        .await?;
    Ok(Json(ReturnResponse {
        success: true,
        message: "Return rejected".to_string(),
        submission,
    }))
}
