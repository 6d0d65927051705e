//! Common test utilities for stormcatchment
//!
//! Shared fixtures, assertions and scenario builders for integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
