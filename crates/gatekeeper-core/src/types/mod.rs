//! Shared domain types.

pub mod id;
pub mod pagination;

pub use id::{AccountId, SessionId};
pub use pagination::{PageRequest, PageResponse};
