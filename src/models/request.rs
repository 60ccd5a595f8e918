//! Borrow request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{RequestState, ToolState};

/// Borrow request from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub tool_id: i32,
    pub state: RequestState,
    /// When the user intends to start using the tool
    pub use_date: NaiveDate,
    /// When the user intends to return it
    pub return_date: NaiveDate,
    pub reason: Option<String>,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request with joined user/tool details for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub tool_id: i32,
    pub tool_name: String,
    pub qr_code: String,
    pub tool_state: ToolState,
    pub state: RequestState,
    pub use_date: NaiveDate,
    pub return_date: NaiveDate,
    pub reason: Option<String>,
    pub reviewer_name: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Create request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequest {
    pub tool_id: i32,
    pub use_date: NaiveDate,
    pub return_date: NaiveDate,
    pub reason: Option<String>,
}

/// Admin review body (approve / reject)
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub comment: Option<String>,
}
