//! # gatekeeper-store
//!
//! Persistence for accounts and sessions. The [`AccountStore`] and
//! [`SessionStore`] traits are the only view the services have of storage;
//! two backends implement them:
//!
//! - `memory`: process-local maps behind `tokio::sync::RwLock`, used by
//!   tests and single-node deployments.
//! - `postgres`: sqlx repositories over a [`postgres::DatabasePool`].

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;

pub use traits::{AccountChange, AccountStore, OperatorStats, SessionStore};
