//! Configuration loader implementations.

use std::path::Path;
use std::{env, fs};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::schema::{RemoteSettings, ToolflowConfig};

/// Overrides [`ToolflowConfig::log_filter`].
pub const LOG_ENV: &str = "TOOLFLOW_LOG";
/// Overrides [`ExportSettings::chunk_budget`](crate::ExportSettings::chunk_budget).
pub const CHUNK_BUDGET_ENV: &str = "TOOLFLOW_CHUNK_BUDGET";
/// Sets or overrides the remote endpoint.
pub const REMOTE_URL_ENV: &str = "TOOLFLOW_REMOTE_URL";
/// Overrides the remote timeout in seconds.
pub const REMOTE_TIMEOUT_ENV: &str = "TOOLFLOW_REMOTE_TIMEOUT_SECS";
/// Overrides the remote bearer token.
pub const REMOTE_API_KEY_ENV: &str = "TOOLFLOW_REMOTE_API_KEY";

/// Loads configuration from `path` (when given) and the process environment.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, when an override holds a
/// malformed value, or when the merged configuration does not validate.
pub fn load(path: Option<&Path>) -> Result<ToolflowConfig> {
    let config = match path {
        Some(path) => read_file(path)?,
        None => ToolflowConfig::default(),
    };
    apply_overrides(config, |key| env::var(key).ok())
}

/// Applies `TOOLFLOW_*` overrides resolved through `lookup`, then validates.
///
/// # Errors
///
/// Fails when an override holds a malformed value or the result does not
/// validate.
pub fn apply_overrides(
    mut config: ToolflowConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ToolflowConfig> {
    if let Some(filter) = lookup(LOG_ENV) {
        config.log_filter = filter;
    }

    if let Some(raw) = lookup(CHUNK_BUDGET_ENV) {
        let budget = raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("invalid {CHUNK_BUDGET_ENV} value {raw:?}"))?;
        config.export.chunk_budget = Some(budget);
    }

    if let Some(endpoint) = lookup(REMOTE_URL_ENV) {
        match config.remote.as_mut() {
            Some(remote) => remote.endpoint = endpoint,
            None => config.remote = Some(RemoteSettings::new(endpoint)),
        }
    }

    let timeout = lookup(REMOTE_TIMEOUT_ENV);
    let api_key = lookup(REMOTE_API_KEY_ENV);
    match config.remote.as_mut() {
        Some(remote) => {
            if let Some(raw) = timeout {
                remote.timeout_secs = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid {REMOTE_TIMEOUT_ENV} value {raw:?}"))?;
            }
            if api_key.is_some() {
                remote.api_key = api_key;
            }
        }
        None => {
            if timeout.is_some() || api_key.is_some() {
                warn!("remote overrides ignored because no remote endpoint is configured");
            }
        }
    }

    config.validate()?;
    debug!(
        log_filter = %config.log_filter,
        chunk_budget = ?config.export.chunk_budget,
        remote = config.remote.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

fn read_file(path: &Path) -> Result<ToolflowConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse configuration file {}", path.display()))
}
