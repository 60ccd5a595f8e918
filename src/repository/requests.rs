//! Borrow request repository
//!
//! Approval and rejection run as single transactions. The request row and the
//! tool row are locked with `SELECT ... FOR UPDATE` so two admins reviewing
//! the same request, or two requests for the same tool, serialize instead of
//! both succeeding.

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::enums::{RequestState, ToolState};
use crate::models::history::actions;
use crate::models::request::{BorrowRequest, CreateRequest, RequestDetails};

use super::history::HistoryRepository;

const DETAILS_SELECT: &str = "SELECT r.id, r.user_id, u.name AS user_name, u.email AS user_email,
            r.tool_id, t.name AS tool_name, t.qr_code, t.state AS tool_state,
            r.state, r.use_date, r.return_date, r.reason,
            rv.name AS reviewer_name, r.reviewed_at, r.admin_comment, r.created_at
     FROM requests r
     JOIN users u ON u.id = r.user_id
     JOIN tools t ON t.id = r.tool_id
     LEFT JOIN users rv ON rv.id = r.reviewed_by";

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i32, create: &CreateRequest) -> AppResult<i32> {
        if create.return_date < create.use_date {
            return Err(AppError::Validation(
                "Return date cannot be before the use date".into(),
            ));
        }

        // Requests may target a tool that is currently out; availability is
        // only checked at approval time.
        let tool_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tools WHERE id = $1)")
                .bind(create.tool_id)
                .fetch_one(&self.pool)
                .await?;
        if !tool_exists {
            return Err(AppError::NotFound("Tool not found".into()));
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM requests
             WHERE user_id = $1 AND tool_id = $2 AND state = 'pending')",
        )
        .bind(user_id)
        .bind(create.tool_id)
        .fetch_one(&self.pool)
        .await?;
        if duplicate {
            return Err(AppError::Conflict(
                "You already have a pending request for this tool".into(),
            ));
        }

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO requests (user_id, tool_id, use_date, return_date, reason)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(create.tool_id)
        .bind(create.use_date)
        .bind(create.return_date)
        .bind(&create.reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn list(&self, state: Option<RequestState>) -> AppResult<Vec<RequestDetails>> {
        let requests = match state {
            Some(state) => {
                let sql = format!("{DETAILS_SELECT} WHERE r.state = $1 ORDER BY r.created_at DESC");
                sqlx::query_as::<_, RequestDetails>(&sql)
                    .bind(state)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{DETAILS_SELECT} ORDER BY r.created_at DESC");
                sqlx::query_as::<_, RequestDetails>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(requests)
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<RequestDetails>> {
        let sql = format!("{DETAILS_SELECT} WHERE r.user_id = $1 ORDER BY r.created_at DESC");
        let requests = sqlx::query_as::<_, RequestDetails>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    pub async fn get(&self, id: i32) -> AppResult<RequestDetails> {
        let sql = format!("{DETAILS_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, RequestDetails>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".into()))
    }

    /// Approve a pending request and open the loan.
    ///
    /// The whole transition is one transaction: mark the request approved,
    /// insert the loan copying the requested dates, flip the tool to loaned
    /// and write the audit entry. Returns the new loan id.
    pub async fn approve(
        &self,
        id: i32,
        admin_id: i32,
        comment: Option<&str>,
    ) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT id, user_id, tool_id, state, use_date, return_date, reason,
                    reviewed_by, reviewed_at, admin_comment, created_at
             FROM requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".into()))?;

        if request.state != RequestState::Pending {
            return Err(AppError::Conflict(format!(
                "The request was already {}",
                request.state
            )));
        }

        let tool_state: ToolState =
            sqlx::query_scalar("SELECT state FROM tools WHERE id = $1 FOR UPDATE")
                .bind(request.tool_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Tool not found".into()))?;
        if !tool_state.is_lendable() {
            return Err(AppError::Conflict(format!(
                "Tool is not available, current state: '{tool_state}'"
            )));
        }

        sqlx::query(
            "UPDATE requests
             SET state = 'approved', reviewed_by = $1, reviewed_at = NOW(), admin_comment = $2
             WHERE id = $3",
        )
        .bind(admin_id)
        .bind(comment)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let loan_id: i32 = sqlx::query_scalar(
            "INSERT INTO loans (request_id, user_id, tool_id, approved_by,
                                loan_date, approval_date, estimated_return_date, notes)
             VALUES ($1, $2, $3, $4, $5, NOW(), $6, $7)
             RETURNING id",
        )
        .bind(request.id)
        .bind(request.user_id)
        .bind(request.tool_id)
        .bind(admin_id)
        .bind(request.use_date)
        .bind(request.return_date)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tools SET state = 'loaned', updated_at = NOW() WHERE id = $1")
            .bind(request.tool_id)
            .execute(&mut *tx)
            .await?;

        HistoryRepository::record_tx(
            &mut tx,
            admin_id,
            actions::APPROVE_REQUEST,
            "request",
            id,
            Some(&format!("Opened loan {loan_id}")),
        )
        .await?;

        tx.commit().await?;
        Ok(loan_id)
    }

    /// Reject a pending request. The comment is mandatory and is surfaced to
    /// the requester.
    pub async fn reject(&self, id: i32, admin_id: i32, comment: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let state: RequestState =
            sqlx::query_scalar("SELECT state FROM requests WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Request not found".into()))?;
        if state != RequestState::Pending {
            return Err(AppError::Conflict(format!(
                "The request was already {state}"
            )));
        }

        sqlx::query(
            "UPDATE requests
             SET state = 'rejected', reviewed_by = $1, reviewed_at = NOW(), admin_comment = $2
             WHERE id = $3",
        )
        .bind(admin_id)
        .bind(comment)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        HistoryRepository::record_tx(
            &mut tx,
            admin_id,
            actions::REJECT_REQUEST,
            "request",
            id,
            Some(comment),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Cancel a pending request. Only its owner may cancel it.
    pub async fn cancel(&self, id: i32, user_id: i32) -> AppResult<()> {
        let row: Option<(i32, RequestState)> =
            sqlx::query_as("SELECT user_id, state FROM requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let (owner_id, state) =
            row.ok_or_else(|| AppError::NotFound("Request not found".into()))?;

        if owner_id != user_id {
            return Err(AppError::Authorization(
                "You can only cancel your own requests".into(),
            ));
        }
        if state != RequestState::Pending {
            return Err(AppError::Conflict(format!(
                "The request was already {state}"
            )));
        }

        sqlx::query("UPDATE requests SET state = 'cancelled' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
