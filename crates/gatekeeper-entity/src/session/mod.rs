//! Participation session entity.

pub mod kind;
pub mod model;

pub use kind::{ParticipantRole, SessionType};
pub use model::{CreateSessionRequest, Session};
