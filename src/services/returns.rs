//! Return review workflow service

use crate::error::{AppError, AppResult};
use crate::models::enums::{ReturnState, ToolState};
use crate::models::tool_return::{CreateReturn, ReturnDetails};
use crate::repository::Repository;

#[derive(Clone)]
pub struct ReturnsService {
    repository: Repository,
}

impl ReturnsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn submit(&self, user_id: i32, create: &CreateReturn) -> AppResult<ReturnDetails> {
        if create.condition_report.trim().is_empty() {
            return Err(AppError::Validation(
                "A condition report is required".into(),
            ));
        }
        let id = self.repository.returns.submit(user_id, create).await?;
        self.repository.returns.get(id).await
    }

    pub async fn list(&self, state: Option<ReturnState>) -> AppResult<Vec<ReturnDetails>> {
        self.repository.returns.list(state).await
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ReturnDetails>> {
        self.repository.returns.list_for_user(user_id).await
    }

    pub async fn get(&self, id: i32) -> AppResult<ReturnDetails> {
        self.repository.returns.get(id).await
    }

    pub async fn approve(
        &self,
        id: i32,
        admin_id: i32,
        new_tool_state: ToolState,
        admin_notes: Option<&str>,
    ) -> AppResult<ReturnDetails> {
        self.repository
            .returns
            .approve(id, admin_id, new_tool_state, admin_notes)
            .await?;
        self.repository.returns.get(id).await
    }

    pub async fn reject(
        &self,
        id: i32,
        admin_id: i32,
        admin_notes: &str,
    ) -> AppResult<ReturnDetails> {
        let notes = admin_notes.trim();
        if notes.is_empty() {
            return Err(AppError::Validation(
                "Rejection notes are required".into(),
            ));
        }
        self.repository.returns.reject(id, admin_id, notes).await?;
        self.repository.returns.get(id).await
    }
}
