//! # gatekeeper-service
//!
//! Application services for Gatekeeper. The centre piece is the
//! [`SessionAdmissionController`], which arbitrates concurrent session
//! creation against per-account capacity and operator availability. The
//! remaining services cover registration and login, token refresh and
//! logout, operator management, presence and session listing.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. [`Services`] wires a full set.

pub mod account;
pub mod admission;
pub mod auth;
pub mod container;
pub mod operator;
pub mod presence;
pub mod session;
pub mod validation;

pub use account::{AccountPolicy, AccountService};
pub use admission::{AdmissionDenial, SessionAdmissionController};
pub use auth::{AuthService, TokenResponse};
pub use container::Services;
pub use operator::OperatorService;
pub use presence::PresenceService;
pub use session::SessionService;
