//! Test utilities and helpers for RiskZone
//!
//! Fixtures and async helpers shared by unit tests and the CLI's
//! end-to-end tests.

pub mod async_helpers;
pub mod fixtures;

pub use async_helpers::*;
pub use fixtures::*;
