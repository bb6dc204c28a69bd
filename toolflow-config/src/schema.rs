//! Strongly typed configuration schemas.

use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Root configuration for a toolflow host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolflowConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Tool-schema export settings.
    pub export: ExportSettings,
    /// Remote collaborator for delegated functions, if any.
    pub remote: Option<RemoteSettings>,
}

impl Default for ToolflowConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            export: ExportSettings::default(),
            remote: None,
        }
    }
}

impl ToolflowConfig {
    /// Checks values that deserialisation alone cannot rule out.
    ///
    /// # Errors
    ///
    /// Fails on an empty log filter, a zero chunk budget, or a remote
    /// endpoint without an `http://` or `https://` scheme.
    pub fn validate(&self) -> Result<()> {
        if self.log_filter.trim().is_empty() {
            bail!("log_filter must not be empty");
        }
        if self.export.chunk_budget == Some(0) {
            bail!("export.chunk_budget must be greater than zero");
        }
        if let Some(remote) = &self.remote {
            let endpoint = remote.endpoint.trim();
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                bail!("remote.endpoint must start with http:// or https://, got {endpoint:?}");
            }
        }
        Ok(())
    }
}

/// Tool-schema export settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Character budget per exported chunk; unset exports a single list.
    pub chunk_budget: Option<usize>,
}

/// Remote collaborator connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSettings {
    /// URL receiving forwarded calls.
    pub endpoint: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token sent with each call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl RemoteSettings {
    /// Creates settings for `endpoint` with the default timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

const fn default_remote_timeout_secs() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_SECS
}
