//! Session queries.

use std::sync::Arc;

use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse};
use gatekeeper_entity::Session;
use gatekeeper_store::SessionStore;

/// Read-only access to an account's sessions.
#[derive(Debug, Clone)]
pub struct SessionService {
    sessions: Arc<dyn SessionStore>,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// All sessions of an account, newest first.
    pub async fn list_sessions(
        &self,
        account_id: &str,
        page: PageRequest,
    ) -> AppResult<PageResponse<Session>> {
        let id = AccountId::parse(account_id)?;
        self.sessions.list_by_account(id, page).await
    }

    /// Sessions of an account that have not been closed.
    pub async fn active_sessions(&self, account_id: &str) -> AppResult<Vec<Session>> {
        let id = AccountId::parse(account_id)?;
        self.sessions.list_active_by_account(id).await
    }
}
