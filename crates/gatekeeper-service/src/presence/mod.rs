//! Online presence tracking.

pub mod service;

pub use service::PresenceService;
