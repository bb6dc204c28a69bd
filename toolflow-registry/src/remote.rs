//! Forwarding contract for functions owned by another process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use toolflow_schema::Descriptor;

use crate::function::{FunctionDescriptor, RemoteHandle};
use crate::registry::RegistryResult;

/// Result alias for forwarding operations.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Errors raised while delegating a call to a remote collaborator.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// No forwarder was attached to the registry.
    #[error("no remote forwarder configured")]
    NotConfigured,

    /// Forwarder is misconfigured.
    #[error("remote forwarder not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// Network or protocol failure.
    #[error("remote transport error: {reason}")]
    Transport {
        /// Additional context for the failure.
        reason: String,
    },

    /// The remote call did not finish in time.
    #[error("remote call timed out")]
    Timeout,

    /// The remote collaborator answered with an error or malformed payload.
    #[error("remote response error: {reason}")]
    Response {
        /// Additional context for the failure.
        reason: String,
    },
}

impl ForwardError {
    /// Convenience constructor for configuration failures.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Wire payload sent to the remote collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    name: String,
    args: Vec<Value>,
    handle: RemoteHandle,
}

impl RemoteCall {
    /// Creates a call payload from coerced positional arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Value>, handle: RemoteHandle) -> Self {
        Self {
            name: name.into(),
            args,
            handle,
        }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the coerced positional arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Returns the remote handle.
    #[must_use]
    pub fn handle(&self) -> &RemoteHandle {
        &self.handle
    }
}

/// Trait implemented by remote-forwarding backends.
#[async_trait]
pub trait RemoteForwarder: Send + Sync {
    /// Delegates the call and returns the collaborator's response verbatim.
    async fn forward(&self, call: RemoteCall) -> ForwardResult<Value>;
}

/// Function declaration published by a remote collaborator when it joins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFunctionManifest {
    /// Unique function name.
    pub name: String,
    /// Description shown to the planner.
    #[serde(default)]
    pub description: String,
    /// Ordered parameter descriptors.
    #[serde(default)]
    pub params: Vec<Descriptor>,
    /// Optional return descriptor.
    #[serde(default)]
    pub returns: Option<Descriptor>,
    /// Handle echoed back on every forwarded call.
    pub handle: RemoteHandle,
    /// Whether a human must confirm the call.
    #[serde(default)]
    pub needs_confirmation: bool,
    /// Whether the function is hidden from display affordances.
    #[serde(default)]
    pub hidden: bool,
    /// Whether the function output is meant to be visualised.
    #[serde(default)]
    pub produces_visualization: bool,
}

impl RemoteFunctionManifest {
    /// Converts the manifest into a forwarding descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::registry::RegistryError::InvalidDescriptor`] when the
    /// manifest fails descriptor validation.
    pub fn into_descriptor(self) -> RegistryResult<FunctionDescriptor> {
        let mut builder = FunctionDescriptor::builder(self.name)
            .description(self.description)
            .params(self.params)
            .remote_handle(self.handle)
            .needs_confirmation(self.needs_confirmation)
            .hidden(self.hidden)
            .produces_visualization(self.produces_visualization);
        if let Some(returns) = self.returns {
            builder = builder.returns(returns);
        }
        builder.build()
    }
}
