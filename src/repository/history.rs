//! Audit history repository

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;
use crate::models::history::HistoryEntry;

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an entry inside an open transaction.
    ///
    /// Workflow transitions write their audit row in the same transaction as
    /// the state change, so a rollback discards both.
    pub async fn record_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        action: &str,
        entity_type: &str,
        entity_id: i32,
        details: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO history (user_id, action, entity_type, entity_id, details)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Append an entry outside any transaction.
    pub async fn record(
        &self,
        user_id: i32,
        action: &str,
        entity_type: &str,
        entity_id: i32,
        details: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO history (user_id, action, entity_type, entity_id, details)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(details)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: i32,
    ) -> AppResult<Vec<HistoryEntry>> {
        let entries = sqlx::query_as::<_, HistoryEntry>(
            "SELECT id, user_id, action, entity_type, entity_id, details, created_at
             FROM history
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY created_at DESC",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
