//! Domain types and pure rules shared by the talent onboarding crates.
//!
//! Nothing in here performs I/O. Network access lives in
//! `talent-integration`, stateful workflow logic in `talent-dashboard`.

pub mod candidate;
pub mod error;
pub mod onboarding;
pub mod types;
