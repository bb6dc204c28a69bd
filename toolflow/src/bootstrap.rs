use std::sync::Arc;

use anyhow::{Context, Result};
use toolflow_config::{ExportSettings, RemoteSettings, ToolflowConfig};
use toolflow_registry::export::ToolChunk;
use toolflow_registry::registry::FunctionRegistry;
use toolflow_registry::remote::RemoteForwarder;
use tracing::info;

/// Builds a registry from `config`: attaches an HTTP forwarder when a remote
/// endpoint is configured, then registers every statically collected binding.
///
/// # Errors
///
/// Fails when the remote settings are unusable or a collected binding does
/// not build.
pub fn bootstrap(config: &ToolflowConfig) -> Result<FunctionRegistry> {
    let mut registry = FunctionRegistry::new();
    if let Some(remote) = &config.remote {
        registry.set_forwarder(remote_forwarder(remote)?);
    }

    let collected = registry
        .register_collected()
        .context("failed to register collected functions")?;
    info!(
        collected,
        remote = config.remote.is_some(),
        "function registry ready"
    );
    Ok(registry)
}

/// Exports the registry's active functions, chunked when a budget is set.
#[must_use]
pub fn export_tools(registry: &FunctionRegistry, settings: &ExportSettings) -> Vec<ToolChunk> {
    registry.describe_chunked(settings.chunk_budget.unwrap_or(usize::MAX))
}

#[cfg(feature = "remote")]
fn remote_forwarder(settings: &RemoteSettings) -> Result<Arc<dyn RemoteForwarder>> {
    use std::time::Duration;

    use toolflow_remote::{ForwarderConfig, HttpForwarder};

    let mut config = ForwarderConfig::new(&settings.endpoint)
        .context("invalid remote endpoint")?
        .with_timeout(Duration::from_secs(settings.timeout_secs));
    if let Some(key) = &settings.api_key {
        config = config.with_api_key(key.clone());
    }
    let forwarder = HttpForwarder::new(config).context("failed to build remote forwarder")?;
    Ok(Arc::new(forwarder))
}

#[cfg(not(feature = "remote"))]
fn remote_forwarder(_settings: &RemoteSettings) -> Result<Arc<dyn RemoteForwarder>> {
    anyhow::bail!("remote settings were supplied but the `remote` feature is disabled")
}
