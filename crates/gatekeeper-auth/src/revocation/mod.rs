//! Registry of invalidated token ids.
//!
//! A revoked id stays revoked until the expiry recorded with it; after
//! that the token is dead on its own and the entry can be swept.

pub mod memory;
pub mod sweeper;

pub use memory::MemoryRevocationRegistry;
pub use sweeper::RevocationSweeper;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tracks revoked token ids until their natural expiry.
///
/// Implementations must be safe for concurrent readers and writers and
/// must judge expiry with an injected clock.
pub trait RevocationRegistry: Send + Sync + std::fmt::Debug + 'static {
    /// Record `token_id` as revoked until `expires_at`. Revoking an id
    /// again overwrites the recorded expiry.
    fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>);

    /// Revoke `token_id` unless it is already revoked, as one atomic step.
    /// Returns `true` when this call did the revoking. A lapsed entry counts
    /// as absent and is replaced.
    fn revoke_if_absent(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> bool;

    /// Whether `token_id` is recorded and its expiry is still in the future.
    fn is_revoked(&self, token_id: Uuid) -> bool;

    /// Drop entries whose expiry has passed. Returns how many were removed.
    fn sweep_expired(&self) -> usize;

    /// Number of recorded entries, lapsed or not.
    fn len(&self) -> usize;

    /// Whether nothing is recorded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
