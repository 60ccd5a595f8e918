//! Loan repository
//!
//! Covers direct (scan-to-borrow) loans and the legacy direct return, which
//! closes a loan without going through the review queue.

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::enums::{LoanState, ToolState};
use crate::models::loan::{CreateLoan, LoanDetails};

const DETAILS_SELECT: &str = "SELECT l.id, l.request_id, l.user_id, u.name AS user_name, u.email AS user_email,
            l.tool_id, t.name AS tool_name, t.qr_code, t.image_url,
            a.name AS approver_name, l.state, l.loan_date, l.approval_date,
            l.estimated_return_date, l.actual_return_date, l.notes
     FROM loans l
     JOIN users u ON u.id = l.user_id
     JOIN tools t ON t.id = l.tool_id
     LEFT JOIN users a ON a.id = l.approved_by";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a loan directly from a scan, without a prior request. The tool
    /// row is locked so two concurrent scans cannot both borrow it.
    pub async fn create_direct(&self, user_id: i32, create: &CreateLoan) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let state: ToolState =
            sqlx::query_scalar("SELECT state FROM tools WHERE id = $1 FOR UPDATE")
                .bind(create.tool_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Tool not found".into()))?;
        if !state.is_lendable() {
            return Err(AppError::Conflict(format!(
                "Tool is not available, current state: '{state}'"
            )));
        }

        let loan_id: i32 = sqlx::query_scalar(
            "INSERT INTO loans (user_id, tool_id, loan_date, estimated_return_date, notes)
             VALUES ($1, $2, CURRENT_DATE, $3, $4)
             RETURNING id",
        )
        .bind(user_id)
        .bind(create.tool_id)
        .bind(create.estimated_return_date)
        .bind(&create.notes)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tools SET state = 'loaned', updated_at = NOW() WHERE id = $1")
            .bind(create.tool_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan_id)
    }

    /// Close a loan directly, bypassing the return review queue. The tool
    /// always goes back to available, whatever shape it came back in.
    pub async fn return_direct(&self, id: i32, observations: Option<&str>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i32, LoanState)> =
            sqlx::query_as("SELECT tool_id, state FROM loans WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (tool_id, state) = row.ok_or_else(|| AppError::NotFound("Loan not found".into()))?;
        if state != LoanState::Active {
            return Err(AppError::Conflict("The loan was already returned".into()));
        }

        sqlx::query(
            "UPDATE loans
             SET state = 'returned', actual_return_date = NOW(),
                 notes = CONCAT_WS(E'\\n', notes, $1::text)
             WHERE id = $2",
        )
        .bind(observations)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE tools SET state = 'available', updated_at = NOW() WHERE id = $1")
            .bind(tool_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn list(&self, state: Option<LoanState>) -> AppResult<Vec<LoanDetails>> {
        let loans = match state {
            Some(state) => {
                let sql =
                    format!("{DETAILS_SELECT} WHERE l.state = $1 ORDER BY l.loan_date DESC");
                sqlx::query_as::<_, LoanDetails>(&sql)
                    .bind(state)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{DETAILS_SELECT} ORDER BY l.loan_date DESC");
                sqlx::query_as::<_, LoanDetails>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(loans)
    }

    /// Active loans ordered by due date, soonest first.
    pub async fn list_active(&self) -> AppResult<Vec<LoanDetails>> {
        let sql = format!(
            "{DETAILS_SELECT} WHERE l.state = 'active' ORDER BY l.estimated_return_date"
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE l.user_id = $1 ORDER BY l.loan_date DESC");
        let loans = sqlx::query_as::<_, LoanDetails>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    pub async fn list_active_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let sql = format!(
            "{DETAILS_SELECT} WHERE l.user_id = $1 AND l.state = 'active'
             ORDER BY l.estimated_return_date"
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    pub async fn get(&self, id: i32) -> AppResult<LoanDetails> {
        let sql = format!("{DETAILS_SELECT} WHERE l.id = $1");
        sqlx::query_as::<_, LoanDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Loan not found".into()))
    }

    /// Find the caller's active loan for a scanned tool code.
    pub async fn active_for_qr(&self, qr_code: &str, user_id: i32) -> AppResult<LoanDetails> {
        let sql = format!(
            "{DETAILS_SELECT} WHERE t.qr_code = $1 AND l.user_id = $2 AND l.state = 'active'"
        );
        sqlx::query_as::<_, LoanDetails>(&sql)
            .bind(qr_code)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No active loan of yours matches this tool".into())
            })
    }

    pub async fn user_has_active_loans(&self, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loans WHERE user_id = $1 AND state = 'active')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
