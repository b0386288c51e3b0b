//! # gatekeeper-core
//!
//! Core crate for Gatekeeper. Contains the unified error system and its
//! transport status mapping, configuration schemas, typed identifiers,
//! pagination types, and the clock abstraction used for every
//! time-dependent decision.
//!
//! This crate has **no** internal dependencies on other Gatekeeper crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
