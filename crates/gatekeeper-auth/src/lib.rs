//! # gatekeeper-auth
//!
//! Identity tokens and authorization for Gatekeeper.
//!
//! ## Modules
//!
//! - `jwt`: HMAC-SHA256 token issuance and validation ([`TokenService`])
//! - `revocation`: registry of invalidated token ids and its sweeper
//! - `rbac`: role-to-permission policies and enforcement
//! - `password`: Argon2id hashing behind the [`PasswordHasher`] trait

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod revocation;

pub use jwt::{Claims, RefreshClaims, TokenPair, TokenService};
pub use password::{Argon2Hasher, PasswordHasher};
pub use rbac::{Permission, RbacEnforcer, RbacPolicies};
pub use revocation::{MemoryRevocationRegistry, RevocationRegistry, RevocationSweeper};
