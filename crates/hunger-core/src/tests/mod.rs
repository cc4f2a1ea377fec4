//! Cross-module tests for the resource system.
//!
//! - `scenarios.rs`: end-to-end behaviour through [`ResourceSystem`](crate::system::ResourceSystem)
//! - `determinism.rs`: parallel evaluation produces identical, ordered damage
//! - `properties.rs`: property tests for reconstruct and commit
//! - `helpers.rs`: setup utilities

mod determinism;
mod helpers;

pub use helpers::*;
