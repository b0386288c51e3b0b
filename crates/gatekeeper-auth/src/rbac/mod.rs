//! Role-based authorization.

pub mod enforcer;
pub mod permission;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use permission::Permission;
pub use policies::RbacPolicies;
