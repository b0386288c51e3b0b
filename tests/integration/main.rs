//! End-to-end tests over the wired services and in-memory stores.

mod helpers;

mod admission_test;
mod auth_test;
mod operator_test;
mod revocation_test;
