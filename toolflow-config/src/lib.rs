//! Configuration management for toolflow hosts.
//!
//! [`schema`] holds the typed configuration; [`loader`] reads it from an
//! optional JSON file and layers `TOOLFLOW_*` environment overrides on top.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{apply_overrides, load};
pub use schema::{ExportSettings, RemoteSettings, ToolflowConfig};
