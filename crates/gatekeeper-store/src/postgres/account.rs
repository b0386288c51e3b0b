//! PostgreSQL account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatekeeper_core::error::{AppError, ErrorKind};
use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse};
use gatekeeper_entity::{Account, OperatorStatus};

use super::connection::DatabasePool;
use super::map_db_error;
use crate::traits::{AccountChange, AccountStore, OperatorStats};

const AVAILABLE_OPERATOR_FILTER: &str = "role = 'operator' AND operator_status = 'verified' \
     AND is_available AND is_active";

/// Account store backed by the `accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a store over an existing pool.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    async fn find_one(&self, column: &str, value: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!("SELECT * FROM accounts WHERE {column} = $1"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find account", e))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find account", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        self.find_one("username", username).await
    }

    async fn create(&self, account: &Account) -> AppResult<()> {
        account.validate()?;
        sqlx::query(
            "INSERT INTO accounts (id, username, email, password_hash, role, operator_status, \
                max_sessions, is_available, is_active, total_sessions, is_online, last_seen_at, \
                created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(account.operator_status)
        .bind(account.max_sessions)
        .bind(account.is_available)
        .bind(account.is_active)
        .bind(account.total_sessions)
        .bind(account.is_online)
        .bind(account.last_seen_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create account", e))?;
        Ok(())
    }

    async fn modify(&self, id: AccountId, change: AccountChange<'_>) -> AppResult<Account> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        let mut account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock account", e))?
                .ok_or_else(|| AppError::not_found("account not found"))?;

        change(&mut account)?;
        account.validate()?;

        sqlx::query(
            "UPDATE accounts SET username = $2, email = $3, password_hash = $4, role = $5, \
                operator_status = $6, max_sessions = $7, is_available = $8, is_active = $9, \
                total_sessions = $10, is_online = $11, last_seen_at = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(account.operator_status)
        .bind(account.max_sessions)
        .bind(account.is_available)
        .bind(account.is_active)
        .bind(account.total_sessions)
        .bind(account.is_online)
        .bind(account.last_seen_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_db_error("Failed to update account", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e))?;
        Ok(account)
    }

    async fn record_session_joined(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET total_sessions = total_sessions + 1, is_online = TRUE, \
                updated_at = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record session", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("account not found"));
        }
        Ok(())
    }

    async fn mark_unavailable(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET is_available = FALSE, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(at)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to mark account unavailable", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("account not found"));
        }
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Account>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count accounts", e))?;

        let items = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list accounts", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn list_available_operators(
        &self,
        page: PageRequest,
    ) -> AppResult<PageResponse<Account>> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM accounts WHERE {AVAILABLE_OPERATOR_FILTER}"
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count operators", e))?;

        let items = sqlx::query_as::<_, Account>(&format!(
            "SELECT * FROM accounts WHERE {AVAILABLE_OPERATOR_FILTER} \
             ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list operators", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn operator_stats(&self) -> AppResult<OperatorStats> {
        let rows: Vec<(Option<OperatorStatus>, bool, i64)> = sqlx::query_as(
            "SELECT operator_status, (is_available AND is_active) AS open, COUNT(*) \
             FROM accounts WHERE role = 'operator' \
             GROUP BY operator_status, open",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count operators", e))?;

        let mut stats = OperatorStats::default();
        for (status, open, count) in rows {
            let count = count as u64;
            stats.total += count;
            match status {
                Some(OperatorStatus::Pending) => stats.pending += count,
                Some(OperatorStatus::Verified) => {
                    stats.verified += count;
                    if open {
                        stats.available += count;
                    }
                }
                Some(OperatorStatus::Blocked) => stats.blocked += count,
                None => {}
            }
        }
        Ok(stats)
    }
}
