//! Account entity and its role-conditioned state.

pub mod model;
pub mod operator_status;
pub mod role;

pub use model::{Account, NewAccount};
pub use operator_status::OperatorStatus;
pub use role::AccountRole;
