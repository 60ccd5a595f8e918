//! Audit history model
//!
//! History rows are append-only. Nothing in the codebase updates or deletes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryEntry {
    pub id: i32,
    /// Acting user (admin for most entries); null once that user is deleted
    pub user_id: Option<i32>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i32,
    pub details: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Action identifiers recorded in history rows
pub mod actions {
    pub const APPROVE_REQUEST: &str = "approve_request";
    pub const REJECT_REQUEST: &str = "reject_request";
    pub const APPROVE_RETURN: &str = "approve_return";
    pub const REJECT_RETURN: &str = "reject_return";
    pub const DELETE_TOOL: &str = "delete_tool";
    pub const CREATE_USER: &str = "create_user";
    pub const UPDATE_USER: &str = "update_user";
}
