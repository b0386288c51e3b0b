//! Operator management.

use std::sync::Arc;

use tracing::info;

use gatekeeper_auth::{Claims, Permission, RbacEnforcer};
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::Clock;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse};
use gatekeeper_entity::{Account, OperatorStatus};
use gatekeeper_store::{AccountStore, OperatorStats};

/// Operator-facing account operations.
///
/// Authorization is decided from the caller's token claims, so a role or
/// permission change takes effect on the caller's next token.
#[derive(Debug, Clone)]
pub struct OperatorService {
    accounts: Arc<dyn AccountStore>,
    rbac: RbacEnforcer,
    clock: Arc<dyn Clock>,
}

impl OperatorService {
    /// Creates a new operator service.
    pub fn new(accounts: Arc<dyn AccountStore>, rbac: RbacEnforcer, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            rbac,
            clock,
        }
    }

    /// Toggle whether an operator accepts sessions. Operators may change
    /// their own flag; admins may change anyone's.
    pub async fn update_availability(
        &self,
        caller: &Claims,
        operator_id: &str,
        available: bool,
    ) -> AppResult<Account> {
        let id = AccountId::parse(operator_id)?;
        if caller.sub != id && !caller.is_admin() {
            return Err(AppError::forbidden());
        }

        let now = self.clock.now();
        let account = self
            .accounts
            .modify(id, Box::new(move |account| account.set_availability(available, now)))
            .await?;

        info!(account_id = %id, available, "Operator availability changed");
        Ok(account)
    }

    /// Set an operator's verification status (`pending`, `verified` or
    /// `blocked`).
    pub async fn verify_operator(
        &self,
        caller: &Claims,
        operator_id: &str,
        status: &str,
    ) -> AppResult<Account> {
        self.rbac.require_permission(caller, Permission::OperatorVerify)?;
        let id = AccountId::parse(operator_id)?;
        let status: OperatorStatus = status.parse()?;

        let now = self.clock.now();
        let account = self
            .accounts
            .modify(id, Box::new(move |account| account.set_operator_status(status, now)))
            .await?;

        info!(account_id = %id, %status, verified_by = %caller.sub, "Operator status changed");
        Ok(account)
    }

    /// Active, verified and available operators.
    pub async fn list_available(&self, page: PageRequest) -> AppResult<PageResponse<Account>> {
        self.accounts.list_available_operators(page).await
    }

    /// Operator counts by verification state.
    pub async fn stats(&self, caller: &Claims) -> AppResult<OperatorStats> {
        self.rbac.require_permission(caller, Permission::OperatorStats)?;
        self.accounts.operator_stats().await
    }
}
