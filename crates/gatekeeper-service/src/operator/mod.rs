//! Operator availability, verification and statistics.

pub mod service;

pub use service::OperatorService;
