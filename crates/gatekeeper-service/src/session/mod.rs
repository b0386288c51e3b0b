//! Session history and active-session listing.

pub mod service;

pub use service::SessionService;
