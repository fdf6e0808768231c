//! Session orchestration and port definitions for chatvault.
//!
//! This crate defines the "ports" (codec, store and interpreter traits) that
//! the infrastructure layer implements, plus the inactivity scheduler and the
//! `ContextManager` lifecycle controller. It depends only on
//! `chatvault-types` -- never on `chatvault-infra` or any crypto/IO crate.

pub mod session;

pub use session::manager::{ContextManager, LoadOutcome};
