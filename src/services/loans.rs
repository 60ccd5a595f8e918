//! Loan ledger service

use crate::error::AppResult;
use crate::models::enums::LoanState;
use crate::models::loan::{CreateLoan, LoanDetails};
use crate::repository::Repository;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_direct(&self, user_id: i32, create: &CreateLoan) -> AppResult<LoanDetails> {
        let id = self.repository.loans.create_direct(user_id, create).await?;
        self.repository.loans.get(id).await
    }

    pub async fn return_direct(
        &self,
        id: i32,
        observations: Option<&str>,
    ) -> AppResult<LoanDetails> {
        self.repository.loans.return_direct(id, observations).await?;
        self.repository.loans.get(id).await
    }

    pub async fn list(&self, state: Option<LoanState>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list(state).await
    }

    pub async fn list_active(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_active().await
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_for_user(user_id).await
    }

    pub async fn list_active_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_active_for_user(user_id).await
    }

    pub async fn get(&self, id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get(id).await
    }

    pub async fn active_for_qr(&self, qr_code: &str, user_id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.active_for_qr(qr_code, user_id).await
    }
}
