//! Observability setup for chatvault.
//!
//! - `tracing_setup`: subscriber installation and OpenTelemetry shutdown

pub mod tracing_setup;
