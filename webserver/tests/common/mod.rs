//! Common test utilities for webserver tests

pub mod helpers;

pub use helpers::{SlowGenerator, TestApp};
