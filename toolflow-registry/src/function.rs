//! Function descriptors and the executor trait behind them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use toolflow_schema::Descriptor;

use crate::registry::{RegistryError, RegistryResult};

/// Result alias for function implementations.
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Error returned by a function implementation.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// The implementation could not complete the call.
    #[error("function failed: {reason}")]
    Failed {
        /// Human-readable failure reason, logged but never shown to the caller.
        reason: String,
    },
}

impl FunctionError {
    /// Creates a failure from the supplied reason.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Trait implemented by local function executors.
///
/// Arguments arrive positionally, already coerced and validated against the
/// descriptor's parameter list.
#[async_trait]
pub trait Function: Send + Sync {
    /// Executes the function.
    async fn call(&self, args: Vec<Value>) -> FunctionResult<Value>;
}

#[async_trait]
impl<F, Fut> Function for F
where
    F: Send + Sync + Fn(Vec<Value>) -> Fut,
    Fut: Future<Output = FunctionResult<Value>> + Send,
{
    async fn call(&self, args: Vec<Value>) -> FunctionResult<Value> {
        (self)(args).await
    }
}

struct SyncFunction<F>(F);

#[async_trait]
impl<F> Function for SyncFunction<F>
where
    F: Send + Sync + Fn(Vec<Value>) -> FunctionResult<Value>,
{
    async fn call(&self, args: Vec<Value>) -> FunctionResult<Value> {
        (self.0)(args)
    }
}

/// Opaque token identifying a function owned by a remote collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteHandle(String);

impl RemoteHandle {
    /// Wraps the supplied token.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full callable contract for one backend operation.
#[derive(Clone)]
pub struct FunctionDescriptor {
    name: String,
    description: String,
    params: Vec<Descriptor>,
    returns: Option<Descriptor>,
    remote_handle: Option<RemoteHandle>,
    needs_confirmation: bool,
    hidden: bool,
    produces_visualization: bool,
    implementation: Option<Arc<dyn Function>>,
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("params", &self.params.len())
            .field("returns", &self.returns.is_some())
            .field("remote_handle", &self.remote_handle)
            .field("local", &self.implementation.is_some())
            .finish_non_exhaustive()
    }
}

impl FunctionDescriptor {
    /// Starts building a descriptor with the supplied unique name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FunctionDescriptorBuilder {
        FunctionDescriptorBuilder {
            name: name.into(),
            description: String::new(),
            params: Vec::new(),
            returns: None,
            remote_handle: None,
            needs_confirmation: false,
            hidden: false,
            produces_visualization: false,
            implementation: None,
        }
    }

    /// Returns the registry key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description shown to the planner.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the ordered parameter descriptors.
    #[must_use]
    pub fn params(&self) -> &[Descriptor] {
        &self.params
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Descriptor> {
        self.params.iter().find(|param| param.name() == name)
    }

    /// Returns the declared return descriptor.
    #[must_use]
    pub fn returns(&self) -> Option<&Descriptor> {
        self.returns.as_ref()
    }

    /// Returns the remote handle when invocation is forwarded.
    #[must_use]
    pub fn remote_handle(&self) -> Option<&RemoteHandle> {
        self.remote_handle.as_ref()
    }

    /// Returns `true` when a human must confirm before the call runs.
    #[must_use]
    pub const fn needs_confirmation(&self) -> bool {
        self.needs_confirmation
    }

    /// Returns `true` when the function is hidden from display affordances.
    #[must_use]
    pub const fn hidden(&self) -> bool {
        self.hidden
    }

    /// Returns `true` when the function output is meant to be visualised.
    #[must_use]
    pub const fn produces_visualization(&self) -> bool {
        self.produces_visualization
    }

    pub(crate) fn implementation(&self) -> Option<&Arc<dyn Function>> {
        self.implementation.as_ref()
    }
}

/// Builder for [`FunctionDescriptor`].
pub struct FunctionDescriptorBuilder {
    name: String,
    description: String,
    params: Vec<Descriptor>,
    returns: Option<Descriptor>,
    remote_handle: Option<RemoteHandle>,
    needs_confirmation: bool,
    hidden: bool,
    produces_visualization: bool,
    implementation: Option<Arc<dyn Function>>,
}

impl FunctionDescriptorBuilder {
    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Descriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Replaces the parameter list.
    #[must_use]
    pub fn params(mut self, params: Vec<Descriptor>) -> Self {
        self.params = params;
        self
    }

    /// Declares the return descriptor.
    #[must_use]
    pub fn returns(mut self, returns: Descriptor) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Forwards invocation to a remote collaborator under `handle`.
    #[must_use]
    pub fn remote_handle(mut self, handle: RemoteHandle) -> Self {
        self.remote_handle = Some(handle);
        self
    }

    /// Requires human confirmation before execution.
    #[must_use]
    pub fn needs_confirmation(mut self, needs_confirmation: bool) -> Self {
        self.needs_confirmation = needs_confirmation;
        self
    }

    /// Hides the function from display affordances.
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Marks the function as producing a visualisation.
    #[must_use]
    pub fn produces_visualization(mut self, produces_visualization: bool) -> Self {
        self.produces_visualization = produces_visualization;
        self
    }

    /// Installs an async implementation.
    #[must_use]
    pub fn handler<T>(mut self, function: T) -> Self
    where
        T: Function + 'static,
    {
        self.implementation = Some(Arc::new(function));
        self
    }

    /// Installs a synchronous implementation.
    #[must_use]
    pub fn sync_handler<F>(mut self, function: F) -> Self
    where
        F: Fn(Vec<Value>) -> FunctionResult<Value> + Send + Sync + 'static,
    {
        self.implementation = Some(Arc::new(SyncFunction(function)));
        self
    }

    /// Finalises the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDescriptor`] when the name is empty,
    /// neither an implementation nor a remote handle was supplied, or a
    /// parameter or return descriptor violates its construction invariants.
    pub fn build(self) -> RegistryResult<FunctionDescriptor> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::invalid_descriptor(
                self.name,
                "function name cannot be empty",
            ));
        }

        if self.implementation.is_none() && self.remote_handle.is_none() {
            return Err(RegistryError::invalid_descriptor(
                self.name,
                "an implementation or a remote handle is required",
            ));
        }

        for descriptor in self.params.iter().chain(self.returns.iter()) {
            if let Err(err) = descriptor.check_invariants() {
                return Err(RegistryError::invalid_descriptor(self.name, err.to_string()));
            }
        }

        Ok(FunctionDescriptor {
            name: self.name,
            description: self.description,
            params: self.params,
            returns: self.returns,
            remote_handle: self.remote_handle,
            needs_confirmation: self.needs_confirmation,
            hidden: self.hidden,
            produces_visualization: self.produces_visualization,
            implementation: self.implementation,
        })
    }
}
