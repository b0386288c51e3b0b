//! PostgreSQL session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use gatekeeper_core::error::{AppError, ErrorKind};
use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse, SessionId};
use gatekeeper_entity::Session;

use super::connection::DatabasePool;
use super::map_db_error;
use crate::traits::SessionStore;

/// Session store backed by the `sessions` table.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a store over an existing pool.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find session"))
    }

    async fn find_active_by_external_id(
        &self,
        account_id: AccountId,
        external_id: &str,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions \
             WHERE account_id = $1 AND external_id = $2 AND left_at IS NULL \
             ORDER BY joined_at ASC LIMIT 1",
        )
        .bind(account_id)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find active session"))
    }

    async fn count_active(&self, account_id: AccountId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE account_id = $1 AND left_at IS NULL",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count active sessions"))?;
        Ok(count as u64)
    }

    async fn insert_within_limit(&self, session: &Session, limit: u64) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin admission transaction"))?;

        // Row lock on the account serialises admissions across processes.
        let locked: Option<AccountId> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(session.account_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err("Failed to lock account"))?;
        if locked.is_none() {
            return Err(AppError::not_found("account not found"));
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE account_id = $1 AND left_at IS NULL",
        )
        .bind(session.account_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to count active sessions"))?;

        if active as u64 >= limit {
            debug!(account_id = %session.account_id, active, limit, "Admission limit reached");
            tx.rollback()
                .await
                .map_err(db_err("Failed to roll back admission transaction"))?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO sessions (id, account_id, session_type, external_id, participant_role, \
                joined_at, left_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(session.id)
        .bind(session.account_id)
        .bind(session.session_type)
        .bind(&session.external_id)
        .bind(session.participant_role)
        .bind(session.joined_at)
        .bind(session.left_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to insert session", e))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit admission transaction"))?;
        Ok(true)
    }

    async fn list_active_by_account(&self, account_id: AccountId) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE account_id = $1 AND left_at IS NULL \
             ORDER BY joined_at ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list active sessions"))
    }

    async fn list_by_account(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Session>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count sessions"))?;

        let items = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE account_id = $1 \
             ORDER BY joined_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(account_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list sessions"))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn mark_left(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE sessions SET left_at = $2 WHERE id = $1 AND left_at IS NULL")
                .bind(id)
                .bind(at)
                .execute(&self.pool)
                .await
                .map_err(db_err("Failed to close session"))?;
        Ok(result.rows_affected() > 0)
    }
}
