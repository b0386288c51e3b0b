//! Process-local revocation registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;
use uuid::Uuid;

use gatekeeper_core::traits::Clock;

use super::RevocationRegistry;

/// Revocation entries in a sharded concurrent map.
#[derive(Debug)]
pub struct MemoryRevocationRegistry {
    entries: DashMap<Uuid, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRevocationRegistry {
    /// Create an empty registry judging expiry with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }
}

impl RevocationRegistry for MemoryRevocationRegistry {
    fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) {
        self.entries.insert(token_id, expires_at);
        info!(jti = %token_id, %expires_at, "Token revoked");
    }

    fn revoke_if_absent(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> bool {
        let now = self.clock.now();
        match self.entries.entry(token_id) {
            Entry::Occupied(mut entry) => {
                if now < *entry.get() {
                    return false;
                }
                entry.insert(expires_at);
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
            }
        }
        info!(jti = %token_id, %expires_at, "Token revoked");
        true
    }

    fn is_revoked(&self, token_id: Uuid) -> bool {
        let now = self.clock.now();
        self.entries
            .get(&token_id)
            .is_some_and(|expires_at| now < *expires_at)
    }

    fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| now < *expires_at);
        before.saturating_sub(self.entries.len())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
