//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Port traits take `&str` and slice parameters, which mock generators handle
//! poorly with `async_trait`, so the in-memory implementations are written by
//! hand and expose accessors for asserting on what the services did.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
