//! Tool registry service

use crate::error::{AppError, AppResult};
use crate::models::category::Category;
use crate::models::history::HistoryEntry;
use crate::models::tool::{CreateTool, Tool, ToolDetails, UpdateTool};
use crate::repository::Repository;

#[derive(Clone)]
pub struct ToolsService {
    repository: Repository,
}

impl ToolsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<ToolDetails>> {
        self.repository.tools.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<ToolDetails> {
        self.repository.tools.get(id).await
    }

    pub async fn get_by_qr(&self, qr_code: &str) -> AppResult<ToolDetails> {
        self.repository.tools.get_by_qr(qr_code).await
    }

    pub async fn create(&self, create: &CreateTool) -> AppResult<Tool> {
        if create.qr_code.trim().is_empty() || create.name.trim().is_empty() {
            return Err(AppError::Validation(
                "QR code and name are required".into(),
            ));
        }
        self.repository.tools.create(create).await
    }

    pub async fn update(&self, id: i32, update: &UpdateTool) -> AppResult<ToolDetails> {
        self.repository.tools.update(id, update).await
    }

    pub async fn delete(&self, id: i32, admin_id: i32) -> AppResult<()> {
        self.repository.tools.delete(id, admin_id).await
    }

    pub async fn history(&self, id: i32) -> AppResult<Vec<HistoryEntry>> {
        self.repository.history.list_for_entity("tool", id).await
    }

    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }
}
