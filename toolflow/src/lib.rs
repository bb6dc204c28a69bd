//! Typed function registry and static workflow verification for LLM tool use.
//!
//! This crate bundles the toolflow component crates behind feature flags so
//! hosts can pull in only what they need. [`schema`] and [`registry`] are
//! always available; verification, HTTP forwarding, configuration and
//! telemetry are optional.

#![warn(missing_docs, clippy::pedantic)]

/// Parameter and return descriptors.
pub use toolflow_schema as schema;

/// Function registration, invocation and export.
pub use toolflow_registry as registry;

/// Workflow verification (enabled by `verifier` feature).
#[cfg(feature = "verifier")]
pub use toolflow_verifier as verifier;

/// HTTP forwarding for remote functions (enabled by `remote` feature).
#[cfg(feature = "remote")]
pub use toolflow_remote as remote;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use toolflow_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use toolflow_telemetry as telemetry;

#[cfg(feature = "config")]
mod bootstrap;

#[cfg(feature = "config")]
pub use bootstrap::{bootstrap, export_tools};
