//! Token-based login, refresh, logout and request authentication.

pub mod service;

pub use service::{AuthService, TokenResponse};
