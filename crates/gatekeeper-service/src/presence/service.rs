//! Presence updates.

use std::sync::Arc;

use tracing::debug;

use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::Clock;
use gatekeeper_core::types::AccountId;
use gatekeeper_entity::Account;
use gatekeeper_store::AccountStore;

/// Records whether accounts are online.
#[derive(Debug, Clone)]
pub struct PresenceService {
    accounts: Arc<dyn AccountStore>,
    clock: Arc<dyn Clock>,
}

impl PresenceService {
    /// Creates a new presence service.
    pub fn new(accounts: Arc<dyn AccountStore>, clock: Arc<dyn Clock>) -> Self {
        Self { accounts, clock }
    }

    /// Set the online flag and stamp `last_seen_at`.
    pub async fn update_presence(&self, account_id: &str, online: bool) -> AppResult<Account> {
        let id = AccountId::parse(account_id)?;
        let now = self.clock.now();
        let account = self
            .accounts
            .modify(
                id,
                Box::new(move |account| {
                    account.mark_presence(online, now);
                    Ok(())
                }),
            )
            .await?;
        debug!(account_id = %id, online, "Presence updated");
        Ok(account)
    }
}
