//! # gatekeeper-entity
//!
//! Domain entity models for Gatekeeper. Every struct in this crate is a
//! database row or a domain value object. Entities derive `Debug`, `Clone`,
//! `Serialize` and `Deserialize`; stored entities also derive `sqlx::FromRow`.

pub mod account;
pub mod session;

pub use account::{Account, AccountRole, NewAccount, OperatorStatus};
pub use session::{CreateSessionRequest, ParticipantRole, Session, SessionType};
