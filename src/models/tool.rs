//! Tool model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::ToolState;

/// Tool record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tool {
    pub id: i32,
    /// Unique scan code printed on the physical tool
    pub qr_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub state: ToolState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Tool with joined category name for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ToolDetails {
    pub id: i32,
    pub qr_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub state: ToolState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create tool request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTool {
    pub qr_code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

/// Update tool request. Absent fields are left untouched; present fields are
/// applied in a fixed column order.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTool {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub state: Option<ToolState>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateTool {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.state.is_none()
            && self.location.is_none()
            && self.image_url.is_none()
    }
}
