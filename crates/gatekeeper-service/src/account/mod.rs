//! Account registration, credentials and profile management.

pub mod service;

pub use service::{AccountPolicy, AccountService};
