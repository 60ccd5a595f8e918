//! Statistics service
//!
//! Read-only aggregates for the admin dashboard. Counts run straight against
//! the pool; no transaction is needed since nothing here mutates state.

use sqlx::Row;

use crate::api::stats::{StatEntry, StatsResponse, TrendEntry};
use crate::error::AppResult;
use crate::repository::Repository;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn overview(&self) -> AppResult<StatsResponse> {
        let pool = &self.repository.pool;

        let total_tools: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tools")
            .fetch_one(pool)
            .await?;
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        let pending_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM requests WHERE state = 'pending'")
                .fetch_one(pool)
                .await?;
        let pending_returns: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM returns WHERE state = 'pending'")
                .fetch_one(pool)
                .await?;
        let active_loans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE state = 'active'")
                .fetch_one(pool)
                .await?;

        let tools_by_state = sqlx::query(
            "SELECT state AS label, COUNT(*) AS value
             FROM tools GROUP BY state ORDER BY value DESC",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect();

        let tools_by_category = sqlx::query(
            "SELECT COALESCE(c.name, 'uncategorized') AS label, COUNT(*) AS value
             FROM tools t
             LEFT JOIN categories c ON c.id = t.category_id
             GROUP BY c.name ORDER BY value DESC",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect();

        let top_requested = sqlx::query(
            "SELECT t.name AS label, COUNT(r.id) AS value
             FROM requests r
             JOIN tools t ON t.id = r.tool_id
             GROUP BY t.id, t.name
             ORDER BY value DESC
             LIMIT 5",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect();

        let loans_last_week = sqlx::query(
            "SELECT loan_date AS day, COUNT(*) AS value
             FROM loans
             WHERE loan_date >= CURRENT_DATE - 6
             GROUP BY loan_date
             ORDER BY loan_date",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| TrendEntry {
            day: row.get("day"),
            value: row.get("value"),
        })
        .collect();

        Ok(StatsResponse {
            success: true,
            total_tools,
            total_users,
            tools_by_state,
            tools_by_category,
            pending_requests,
            pending_returns,
            active_loans,
            top_requested,
            loans_last_week,
        })
    }
}
