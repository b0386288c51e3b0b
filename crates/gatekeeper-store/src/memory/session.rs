//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse, SessionId};
use gatekeeper_entity::Session;

use super::paginate;
use crate::traits::SessionStore;

/// Sessions held in a process-local map.
///
/// `insert_within_limit` counts and inserts under a single write lock.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn active_count(sessions: &HashMap<SessionId, Session>, account_id: AccountId) -> u64 {
    sessions
        .values()
        .filter(|s| s.account_id == account_id && s.is_active())
        .count() as u64
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn find_active_by_external_id(
        &self,
        account_id: AccountId,
        external_id: &str,
    ) -> AppResult<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.account_id == account_id && s.external_id == external_id && s.is_active())
            .cloned())
    }

    async fn count_active(&self, account_id: AccountId) -> AppResult<u64> {
        Ok(active_count(&*self.sessions.read().await, account_id))
    }

    async fn insert_within_limit(&self, session: &Session, limit: u64) -> AppResult<bool> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::conflict("session already exists"));
        }
        if active_count(&sessions, session.account_id) >= limit {
            return Ok(false);
        }
        sessions.insert(session.id, session.clone());
        Ok(true)
    }

    async fn list_active_by_account(&self, account_id: AccountId) -> AppResult<Vec<Session>> {
        let mut active: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.account_id == account_id && s.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|s| s.joined_at);
        Ok(active)
    }

    async fn list_by_account(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> AppResult<PageResponse<Session>> {
        let mut all: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.joined_at.cmp(&a.joined_at).then(b.id.cmp(&a.id)));
        Ok(paginate(all, page))
    }

    async fn mark_left(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if session.is_active() => {
                session.left_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
