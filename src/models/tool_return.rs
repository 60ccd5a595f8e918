//! Return submission model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{ReturnState, ToolState};

/// Return submission with joined user/tool/loan details
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnDetails {
    pub id: i32,
    pub loan_id: i32,
    pub tool_id: i32,
    pub tool_name: String,
    pub qr_code: String,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub state: ReturnState,
    pub submitted_at: DateTime<Utc>,
    pub condition_report: String,
    pub user_notes: Option<String>,
    pub loan_date: NaiveDate,
    pub estimated_return_date: NaiveDate,
    pub reviewer_name: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub new_tool_state: Option<ToolState>,
    pub admin_notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Create return submission body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReturn {
    pub loan_id: i32,
    /// Tool the user actually scanned; must match the loan's tool
    pub tool_id: i32,
    pub condition_report: String,
    pub user_notes: Option<String>,
}

/// Approve return body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveReturn {
    /// Must be one of available / maintenance / decommissioned
    pub new_tool_state: ToolState,
    pub admin_notes: Option<String>,
}

/// Reject return body
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectReturn {
    pub admin_notes: String,
}
