//! Return submission repository
//!
//! A user hands a tool back by submitting a return for review. The loan and
//! the tool stay untouched until an admin approves; rejection leaves the loan
//! active so the user can resubmit.

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::enums::{LoanState, ReturnState, ToolState};
use crate::models::history::actions;
use crate::models::tool_return::{CreateReturn, ReturnDetails};

use super::history::HistoryRepository;

const DETAILS_SELECT: &str = "SELECT r.id, r.loan_id, r.tool_id, t.name AS tool_name, t.qr_code,
            r.user_id, u.name AS user_name, u.email AS user_email,
            r.state, r.submitted_at, r.condition_report, r.user_notes,
            l.loan_date, l.estimated_return_date,
            rv.name AS reviewer_name, r.reviewed_at, r.new_tool_state, r.admin_notes,
            r.created_at
     FROM returns r
     JOIN loans l ON l.id = r.loan_id
     JOIN tools t ON t.id = r.tool_id
     JOIN users u ON u.id = r.user_id
     LEFT JOIN users rv ON rv.id = r.reviewed_by";

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Submit a return for review. The scanned tool must be the one on loan,
    /// and a loan can only have one pending submission at a time.
    pub async fn submit(&self, user_id: i32, create: &CreateReturn) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let loan: Option<(i32, i32, LoanState)> = sqlx::query_as(
            "SELECT user_id, tool_id, state FROM loans WHERE id = $1 FOR UPDATE",
        )
        .bind(create.loan_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (owner_id, loan_tool_id, loan_state) = match loan {
            Some(l) => l,
            None => return Err(AppError::NotFound("Loan not found".into())),
        };
        if owner_id != user_id || loan_state != LoanState::Active {
            return Err(AppError::NotFound(
                "Loan not found or already returned".into(),
            ));
        }

        let scanned: Option<i32> =
            sqlx::query_scalar("SELECT id FROM tools WHERE id = $1")
                .bind(create.tool_id)
                .fetch_optional(&mut *tx)
                .await?;
        let scanned = scanned.ok_or_else(|| AppError::NotFound("Tool not found".into()))?;
        if scanned != loan_tool_id {
            return Err(AppError::Validation(
                "The scanned code does not match the tool on loan".into(),
            ));
        }

        let pending: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM returns WHERE loan_id = $1 AND state = 'pending')",
        )
        .bind(create.loan_id)
        .fetch_one(&mut *tx)
        .await?;
        if pending {
            return Err(AppError::Conflict(
                "This loan already has a pending return".into(),
            ));
        }

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO returns (loan_id, tool_id, user_id, condition_report, user_notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(create.loan_id)
        .bind(create.tool_id)
        .bind(user_id)
        .bind(&create.condition_report)
        .bind(&create.user_notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    pub async fn list(&self, state: Option<ReturnState>) -> AppResult<Vec<ReturnDetails>> {
        let returns = match state {
            Some(state) => {
                let sql =
                    format!("{DETAILS_SELECT} WHERE r.state = $1 ORDER BY r.submitted_at DESC");
                sqlx::query_as::<_, ReturnDetails>(&sql)
                    .bind(state)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{DETAILS_SELECT} ORDER BY r.submitted_at DESC");
                sqlx::query_as::<_, ReturnDetails>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(returns)
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<ReturnDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE r.user_id = $1 ORDER BY r.submitted_at DESC");
        let returns = sqlx::query_as::<_, ReturnDetails>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(returns)
    }

    pub async fn get(&self, id: i32) -> AppResult<ReturnDetails> {
        let sql = format!("{DETAILS_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, ReturnDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Return not found".into()))
    }

    /// Approve a pending return. One transaction closes the loan, moves the
    /// tool to the state the admin chose and records the audit entry.
    pub async fn approve(
        &self,
        id: i32,
        admin_id: i32,
        new_tool_state: ToolState,
        admin_notes: Option<&str>,
    ) -> AppResult<()> {
        if !new_tool_state.is_return_outcome() {
            return Err(AppError::Validation(format!(
                "'{new_tool_state}' is not a valid state for a returned tool"
            )));
        }

        let mut tx = self.pool.begin().await?;

        let row: Option<(i32, i32, ReturnState)> =
            sqlx::query_as("SELECT loan_id, tool_id, state FROM returns WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (loan_id, tool_id, state) =
            row.ok_or_else(|| AppError::NotFound("Return not found".into()))?;
        if state != ReturnState::Pending {
            return Err(AppError::Conflict(format!("The return was already {state}")));
        }

        sqlx::query(
            "UPDATE returns
             SET state = 'approved', reviewed_by = $1, reviewed_at = NOW(),
                 new_tool_state = $2, admin_notes = $3
             WHERE id = $4",
        )
        .bind(admin_id)
        .bind(new_tool_state)
        .bind(admin_notes)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE loans SET state = 'returned', actual_return_date = NOW() WHERE id = $1",
        )
        .bind(loan_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE tools SET state = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_tool_state)
            .bind(tool_id)
            .execute(&mut *tx)
            .await?;

        HistoryRepository::record_tx(
            &mut tx,
            admin_id,
            actions::APPROVE_RETURN,
            "return",
            id,
            Some(&format!("Tool {tool_id} set to '{new_tool_state}'")),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Reject a pending return. The loan stays active and the tool stays
    /// loaned; the notes tell the user what to fix before resubmitting.
    pub async fn reject(&self, id: i32, admin_id: i32, admin_notes: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let state: Option<ReturnState> =
            sqlx::query_scalar("SELECT state FROM returns WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let state = state.ok_or_else(|| AppError::NotFound("Return not found".into()))?;
        if state != ReturnState::Pending {
            return Err(AppError::Conflict(format!("The return was already {state}")));
        }

        sqlx::query(
            "UPDATE returns
             SET state = 'rejected', reviewed_by = $1, reviewed_at = NOW(), admin_notes = $2
             WHERE id = $3",
        )
        .bind(admin_id)
        .bind(admin_notes)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        HistoryRepository::record_tx(
            &mut tx,
            admin_id,
            actions::REJECT_RETURN,
            "return",
            id,
            Some(admin_notes),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
