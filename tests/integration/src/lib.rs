//! Integration test utilities for the bot gateway client
//!
//! This crate provides a mock open platform (token endpoint, REST API and WebSocket
//! gateway) for end-to-end tests of the client crates.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
