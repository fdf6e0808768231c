//! Shared domain types for chatvault.
//!
//! This crate contains the domain types used across the workspace:
//! the session context, update requests, lifecycle state, configuration,
//! and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod session;
