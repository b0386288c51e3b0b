//! Per-account serialisation of admissions.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use gatekeeper_core::types::AccountId;

/// One async mutex per account with admissions in flight.
///
/// Entries are created on demand and removed when the last holder or
/// waiter lets go, so idle accounts cost nothing.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `account_id`.
    pub async fn acquire(&self, account_id: AccountId) -> AccountGuard<'_> {
        let lock = self.locks.entry(account_id).or_default().clone();
        let guard = lock.lock_owned().await;
        AccountGuard {
            table: self,
            account_id,
            guard: Some(guard),
        }
    }

    /// Number of accounts with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no account holds a lock entry.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one account; released on drop.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    table: &'a AccountLocks,
    account_id: AccountId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the table's own reference left: nobody holds or waits.
        self.table
            .locks
            .remove_if(&self.account_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
