//! Store traits consumed by the services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse, SessionId};
use gatekeeper_entity::{Account, Session};

/// Counts of operator accounts by verification state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorStats {
    /// All operator accounts.
    pub total: u64,
    /// Awaiting verification.
    pub pending: u64,
    /// Verified.
    pub verified: u64,
    /// Blocked.
    pub blocked: u64,
    /// Active, verified and currently available.
    pub available: u64,
}

/// A change applied to a stored account by [`AccountStore::modify`].
pub type AccountChange<'a> = Box<dyn FnOnce(&mut Account) -> AppResult<()> + Send + 'a>;

/// Account persistence.
///
/// Lookups return `Ok(None)` for a missing record; every other failure is
/// an error.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by id.
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>>;

    /// Find an account by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Find an account by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Insert a new account. Duplicate email or username is a conflict.
    async fn create(&self, account: &Account) -> AppResult<()>;

    /// Apply `change` to the current stored account and persist the result,
    /// as one atomic read-modify-write. Concurrent writers to the same
    /// account are serialised. A missing account is not-found; taking
    /// another account's email or username is a conflict. An error from
    /// `change` leaves the stored account untouched.
    async fn modify(&self, id: AccountId, change: AccountChange<'_>) -> AppResult<Account>;

    /// Count one admitted session and mark the account online. Touches no
    /// other column.
    async fn record_session_joined(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()>;

    /// Clear the availability flag after the account hit its capacity.
    /// Touches no other column.
    async fn mark_unavailable(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()>;

    /// List accounts, oldest first.
    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Account>>;

    /// List active, verified, available operators, oldest first.
    async fn list_available_operators(&self, page: PageRequest)
    -> AppResult<PageResponse<Account>>;

    /// Count operators by status.
    async fn operator_stats(&self) -> AppResult<OperatorStats>;
}

/// Session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a session by id.
    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>>;

    /// Find the active session of an account for a correlation key.
    async fn find_active_by_external_id(
        &self,
        account_id: AccountId,
        external_id: &str,
    ) -> AppResult<Option<Session>>;

    /// Number of active sessions held by an account.
    async fn count_active(&self, account_id: AccountId) -> AppResult<u64>;

    /// Insert `session` only if the account holds fewer than `limit` active
    /// sessions, as one atomic step. Returns `false` when the limit is
    /// already reached and nothing was written.
    async fn insert_within_limit(&self, session: &Session, limit: u64) -> AppResult<bool>;

    /// Active sessions of an account, oldest first.
    async fn list_active_by_account(&self, account_id: AccountId) -> AppResult<Vec<Session>>;

    /// All sessions of an account, newest first.
    async fn list_by_account(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Session>>;

    /// Close an active session. Returns `false` if it was unknown or
    /// already closed.
    async fn mark_left(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<bool>;
}
