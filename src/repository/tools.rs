//! Tool repository

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::enums::ToolState;
use crate::models::history::actions;
use crate::models::tool::{CreateTool, Tool, ToolDetails, UpdateTool};

use super::history::HistoryRepository;

const DETAILS_SELECT: &str = "SELECT t.id, t.qr_code, t.name, t.description, t.category_id,
            c.name AS category_name, t.location, t.image_url, t.state,
            t.created_at, t.updated_at
     FROM tools t
     LEFT JOIN categories c ON c.id = t.category_id";

#[derive(Clone)]
pub struct ToolsRepository {
    pool: Pool<Postgres>,
}

impl ToolsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<ToolDetails>> {
        let sql = format!("{DETAILS_SELECT} ORDER BY t.created_at DESC");
        let tools = sqlx::query_as::<_, ToolDetails>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(tools)
    }

    pub async fn get(&self, id: i32) -> AppResult<ToolDetails> {
        let sql = format!("{DETAILS_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, ToolDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Tool not found".into()))
    }

    pub async fn get_by_qr(&self, qr_code: &str) -> AppResult<ToolDetails> {
        let sql = format!("{DETAILS_SELECT} WHERE t.qr_code = $1");
        sqlx::query_as::<_, ToolDetails>(&sql)
            .bind(qr_code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Tool not found".into()))
    }

    pub async fn create(&self, create: &CreateTool) -> AppResult<Tool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tools WHERE qr_code = $1)")
                .bind(&create.qr_code)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AppError::Conflict(
                "A tool with this QR code already exists".into(),
            ));
        }

        let tool = sqlx::query_as::<_, Tool>(
            "INSERT INTO tools (qr_code, name, description, category_id, location, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, qr_code, name, description, category_id, location, image_url,
                       state, created_at, updated_at",
        )
        .bind(&create.qr_code)
        .bind(&create.name)
        .bind(&create.description)
        .bind(create.category_id)
        .bind(&create.location)
        .bind(&create.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(tool)
    }

    /// Apply a partial update. Present fields are written in a fixed column
    /// order; absent fields are left untouched.
    ///
    /// A state change is refused while the tool is on loan. Loans own the
    /// `loaned` state, so it cannot be set here at all.
    pub async fn update(&self, id: i32, update: &UpdateTool) -> AppResult<ToolDetails> {
        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".into()));
        }
        if update.state == Some(ToolState::Loaned) {
            return Err(AppError::Validation(
                "Tool state 'loaned' is managed through loans".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let current: Option<ToolState> =
            sqlx::query_scalar("SELECT state FROM tools WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or_else(|| AppError::NotFound("Tool not found".into()))?;

        if let Some(new_state) = update.state {
            if new_state != current {
                let on_loan: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM loans WHERE tool_id = $1 AND state = 'active')",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                if current == ToolState::Loaned || on_loan {
                    return Err(AppError::Conflict(
                        "Cannot change the state of a tool that is on loan".into(),
                    ));
                }
            }
        }

        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1;
        macro_rules! set_field {
            ($opt:expr, $col:literal) => {
                if $opt.is_some() {
                    sets.push(format!(concat!($col, " = ${}"), idx));
                    idx += 1;
                }
            };
        }
        set_field!(update.name, "name");
        set_field!(update.description, "description");
        set_field!(update.category_id, "category_id");
        set_field!(update.state, "state");
        set_field!(update.location, "location");
        set_field!(update.image_url, "image_url");
        sets.push("updated_at = NOW()".into());

        let sql = format!("UPDATE tools SET {} WHERE id = ${}", sets.join(", "), idx);
        let mut query = sqlx::query(&sql);
        if let Some(v) = &update.name {
            query = query.bind(v);
        }
        if let Some(v) = &update.description {
            query = query.bind(v);
        }
        if let Some(v) = update.category_id {
            query = query.bind(v);
        }
        if let Some(v) = update.state {
            query = query.bind(v);
        }
        if let Some(v) = &update.location {
            query = query.bind(v);
        }
        if let Some(v) = &update.image_url {
            query = query.bind(v);
        }
        query.bind(id).execute(&mut *tx).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Delete a tool. Only allowed for tools that are available or
    /// decommissioned and have no active loan. Records an audit entry.
    pub async fn delete(&self, id: i32, admin_id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let tool: Option<(ToolState, String)> =
            sqlx::query_as("SELECT state, name FROM tools WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (state, name) = tool.ok_or_else(|| AppError::NotFound("Tool not found".into()))?;

        if !state.is_deletable() {
            return Err(AppError::Conflict(format!(
                "Cannot delete a tool in state '{state}'"
            )));
        }
        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE tool_id = $1 AND state = 'active')",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if on_loan {
            return Err(AppError::Conflict(
                "Cannot delete a tool with an active loan".into(),
            ));
        }

        // Requests and past loans for the tool go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM tools WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        HistoryRepository::record_tx(
            &mut tx,
            admin_id,
            actions::DELETE_TOOL,
            "tool",
            id,
            Some(&format!("Deleted tool '{name}'")),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
