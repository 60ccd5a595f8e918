//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::LoanState;

/// Loan with joined user/tool details. The `request_id` is absent for
/// direct (scan-to-borrow) loans.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub request_id: Option<i32>,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub tool_id: i32,
    pub tool_name: String,
    pub qr_code: String,
    pub image_url: Option<String>,
    pub approver_name: Option<String>,
    pub state: LoanState,
    pub loan_date: NaiveDate,
    pub approval_date: Option<DateTime<Utc>>,
    pub estimated_return_date: NaiveDate,
    pub actual_return_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Direct loan creation body (scan-to-borrow, no prior request)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub tool_id: i32,
    pub estimated_return_date: NaiveDate,
    pub notes: Option<String>,
}

/// Legacy direct return body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DirectReturn {
    pub observations: Option<String>,
}
