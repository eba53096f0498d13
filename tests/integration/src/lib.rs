//! Integration test utilities for the roster sync server
//!
//! This crate provides helpers for running end-to-end tests against the
//! HTTP surface, backed by the in-memory ports from `roster-service`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
