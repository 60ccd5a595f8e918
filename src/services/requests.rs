//! Borrow request workflow service

use crate::error::{AppError, AppResult};
use crate::models::enums::RequestState;
use crate::models::request::{CreateRequest, RequestDetails};
use crate::repository::Repository;

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, user_id: i32, create: &CreateRequest) -> AppResult<i32> {
        self.repository.requests.create(user_id, create).await
    }

    pub async fn list(&self, state: Option<RequestState>) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list(state).await
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        self.repository.requests.list_for_user(user_id).await
    }

    pub async fn get(&self, id: i32) -> AppResult<RequestDetails> {
        self.repository.requests.get(id).await
    }

    /// Returns the id of the loan opened by the approval.
    pub async fn approve(
        &self,
        id: i32,
        admin_id: i32,
        comment: Option<&str>,
    ) -> AppResult<i32> {
        self.repository.requests.approve(id, admin_id, comment).await
    }

    pub async fn reject(&self, id: i32, admin_id: i32, comment: Option<&str>) -> AppResult<()> {
        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("A rejection comment is required".into()))?;
        self.repository.requests.reject(id, admin_id, comment).await
    }

    pub async fn cancel(&self, id: i32, user_id: i32) -> AppResult<()> {
        self.repository.requests.cancel(id, user_id).await
    }
}
