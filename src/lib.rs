//! repohub library crate: the pieces of the `repohub` binary that sit
//! around the core model.
//!
//! The primary interface is the `repohub` binary. This lib.rs exposes the
//! configuration, session persistence, output formatting, and telemetry
//! modules so integration tests can exercise them directly. The domain
//! model itself lives in `repohub-core`.

pub mod config;
pub mod format;
pub mod session;
pub mod telemetry;
