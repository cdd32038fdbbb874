//! Common test utilities for designer integration tests

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{CountingGenerator, CountingSearch, TestHelpers};
