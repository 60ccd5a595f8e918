//! Statistics endpoints

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// A labelled count (state, category or tool name)
#[derive(Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

/// Loans opened on one day
#[derive(Serialize, ToSchema)]
pub struct TrendEntry {
    pub day: NaiveDate,
    pub value: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub total_tools: i64,
    pub total_users: i64,
    pub tools_by_state: Vec<StatEntry>,
    pub tools_by_category: Vec<StatEntry>,
    pub pending_requests: i64,
    pub pending_returns: i64,
    pub active_loans: i64,
    /// Five most requested tools, all time
    pub top_requested: Vec<StatEntry>,
    /// Loans per day over the last seven days
    pub loans_last_week: Vec<TrendEntry>,
}

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_admin()?;
    let stats = state.services.stats.overview().await?;
    Ok(Json(stats))
}
