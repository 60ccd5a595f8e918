//! Loan ledger endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::enums::LoanState,
    models::loan::{CreateLoan, DirectReturn, LoanDetails},
};

use super::AuthenticatedUser;

#[derive(Deserialize, ToSchema)]
pub struct LoanListQuery {
    pub state: Option<LoanState>,
}

#[derive(Serialize, ToSchema)]
pub struct LoanListResponse {
    pub success: bool,
    pub loans: Vec<LoanDetails>,
}

#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub success: bool,
    pub message: String,
    pub loan: LoanDetails,
}

/// Borrow a tool directly from a scan, without a prior request
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 400, description = "Tool not available"),
        (status = 404, description = "Tool not found")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state
        .services
        .loans
        .create_direct(claims.user_id, &request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            success: true,
            message: "Loan created".to_string(),
            loan,
        }),
    ))
}

/// Close a loan directly, skipping return review (legacy path)
#[utoipa::path(
    put,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = DirectReturn,
    responses(
        (status = 200, description = "Loan closed", body = LoanResponse),
        (status = 400, description = "Loan already returned"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<DirectReturn>,
) -> AppResult<Json<LoanResponse>> {
    claims.require_admin()?;
    let loan = state
        .services
        .loans
        .return_direct(id, request.observations.as_deref())
        .await?;
    Ok(Json(LoanResponse {
        success: true,
        message: "Loan closed".to_string(),
        loan,
    }))
}

/// List all loans, optionally filtered by state
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("state" = Option<LoanState>, Query, description = "Filter by state")),
    responses(
        (status = 200, description = "Loans", body = LoanListResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanListQuery>,
) -> AppResult<Json<LoanListResponse>> {
    claims.require_admin()?;
    let loans = state.services.loans.list(query.state).await?;
    Ok(Json(LoanListResponse {
        success: true,
        loans,
    }))
}

/// All active loans ordered by due date
#[utoipa::path(
    get,
    path = "/loans/active/all",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active loans", body = LoanListResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_active_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LoanListResponse>> {
    claims.require_admin()?;
    let loans = state.services.loans.list_active().await?;
    Ok(Json(LoanListResponse {
        success: true,
        loans,
    }))
}

/// List the caller's loans
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's loans", body = LoanListResponse)
    )
)]
pub async fn list_my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LoanListResponse>> {
    let loans = state.services.loans.list_for_user(claims.user_id).await?;
    Ok(Json(LoanListResponse {
        success: true,
        loans,
    }))
}

/// List the caller's active loans
#[utoipa::path(
    get,
    path = "/loans/mine/active",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's active loans", body = LoanListResponse)
    )
)]
pub async fn list_my_active_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LoanListResponse>> {
    let loans = state
        .services
        .loans
        .list_active_for_user(claims.user_id)
        .await?;
    Ok(Json(LoanListResponse {
        success: true,
        loans,
    }))
}

/// Get a loan by id (owner or admin)
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan", body = LoanResponse),
        (status = 403, description = "Not the loan owner"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.loans.get(id).await?;
    if !claims.is_admin() && loan.user_id != claims.user_id {
        return Err(AppError::Authorization(
            "You can only view your own loans".into(),
        ));
    }
    Ok(Json(LoanResponse {
        success: true,
        message: "Loan".to_string(),
        loan,
    }))
}
