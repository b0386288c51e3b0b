//! In-memory account store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse};
use gatekeeper_entity::{Account, OperatorStatus};

use super::paginate;
use crate::traits::{AccountChange, AccountStore, OperatorStats};

/// Accounts held in a process-local map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

fn check_unique(accounts: &HashMap<AccountId, Account>, candidate: &Account) -> AppResult<()> {
    for other in accounts.values().filter(|a| a.id != candidate.id) {
        if other.email == candidate.email {
            return Err(AppError::conflict("email already registered"));
        }
        if other.username == candidate.username {
            return Err(AppError::conflict("username already taken"));
        }
    }
    Ok(())
}

fn sorted_by_creation(mut accounts: Vec<Account>) -> Vec<Account> {
    accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    accounts
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.username == username).cloned())
    }

    async fn create(&self, account: &Account) -> AppResult<()> {
        account.validate()?;
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) {
            return Err(AppError::conflict("account already exists"));
        }
        check_unique(&accounts, account)?;
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn modify(&self, id: AccountId, change: AccountChange<'_>) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        let mut account = accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("account not found"))?;
        change(&mut account)?;
        account.validate()?;
        check_unique(&accounts, &account)?;
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn record_session_joined(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("account not found"))?;
        account.record_session_joined(at);
        Ok(())
    }

    async fn mark_unavailable(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("account not found"))?;
        account.mark_saturated(at);
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Account>> {
        let all: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        Ok(paginate(sorted_by_creation(all), page))
    }

    async fn list_available_operators(
        &self,
        page: PageRequest,
    ) -> AppResult<PageResponse<Account>> {
        let available: Vec<Account> = self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| {
                a.is_operator()
                    && a.operator_status == Some(OperatorStatus::Verified)
                    && a.is_available
                    && a.is_active
            })
            .cloned()
            .collect();
        Ok(paginate(sorted_by_creation(available), page))
    }

    async fn operator_stats(&self) -> AppResult<OperatorStats> {
        let accounts = self.accounts.read().await;
        let mut stats = OperatorStats::default();
        for account in accounts.values().filter(|a| a.is_operator()) {
            stats.total += 1;
            match account.operator_status {
                Some(OperatorStatus::Pending) => stats.pending += 1,
                Some(OperatorStatus::Verified) => {
                    stats.verified += 1;
                    if account.is_available && account.is_active {
                        stats.available += 1;
                    }
                }
                Some(OperatorStatus::Blocked) => stats.blocked += 1,
                None => {}
            }
        }
        Ok(stats)
    }
}
