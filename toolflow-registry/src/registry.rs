//! Runtime registry for function descriptors and their invocation.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use toolflow_schema::{FieldError, FieldErrorKind};
use tracing::{debug, info, warn};

use crate::binding;
use crate::export::{ToolChunk, ToolSchema, chunk_tools};
use crate::function::FunctionDescriptor;
use crate::remote::{ForwardError, RemoteCall, RemoteForwarder, RemoteFunctionManifest};

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised by administrative registry calls.
///
/// Data problems met while invoking a function are never reported here; they
/// come back from [`FunctionRegistry::invoke`] as string results.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Requested function does not exist.
    #[error("function `{name}` is not registered")]
    UnknownFunction {
        /// Name of the missing function.
        name: String,
    },

    /// A parameter descriptor has no name, so named arguments cannot be mapped.
    #[error("parameter {index} of function `{function}` has no name")]
    MissingParameterName {
        /// Function being invoked.
        function: String,
        /// Position of the unnamed parameter.
        index: usize,
    },

    /// Function descriptor failed validation.
    #[error("invalid function descriptor `{name}`: {reason}")]
    InvalidDescriptor {
        /// Name of the offending function.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl RegistryError {
    /// Creates an [`RegistryError::InvalidDescriptor`] error.
    #[must_use]
    pub fn invalid_descriptor(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn unknown(name: &str) -> Self {
        Self::UnknownFunction {
            name: name.to_owned(),
        }
    }
}

/// Per-name attributes tracked alongside each descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAttributes {
    active: bool,
    hidden: bool,
    visualization: bool,
}

impl FunctionAttributes {
    fn for_descriptor(descriptor: &FunctionDescriptor) -> Self {
        Self {
            active: true,
            hidden: descriptor.hidden(),
            visualization: descriptor.produces_visualization(),
        }
    }

    /// Returns `true` when the function may be invoked.
    #[must_use]
    pub const fn active(self) -> bool {
        self.active
    }

    /// Returns `true` when the function is excluded from display affordances.
    #[must_use]
    pub const fn hidden(self) -> bool {
        self.hidden
    }

    /// Returns `true` when the function produces a visualisation.
    #[must_use]
    pub const fn visualization(self) -> bool {
        self.visualization
    }
}

struct Entry {
    descriptor: Arc<FunctionDescriptor>,
    attributes: FunctionAttributes,
}

/// Registry mapping function names to descriptors, in registration order.
///
/// Construct one per process (or per test) and share it behind an [`Arc`].
/// Mutations are expected to be rare administrative operations.
#[derive(Default)]
pub struct FunctionRegistry {
    inner: RwLock<IndexMap<String, Entry>>,
    forwarder: Option<Arc<dyn RemoteForwarder>>,
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("registered", &self.names())
            .field("forwarder", &self.forwarder.is_some())
            .finish()
    }
}

impl FunctionRegistry {
    /// Creates an empty registry without a remote forwarder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the forwarder used for descriptors carrying a remote handle.
    #[must_use]
    pub fn with_forwarder(mut self, forwarder: Arc<dyn RemoteForwarder>) -> Self {
        self.set_forwarder(forwarder);
        self
    }

    /// Replaces the remote forwarder.
    pub fn set_forwarder(&mut self, forwarder: Arc<dyn RemoteForwarder>) {
        self.forwarder = Some(forwarder);
    }

    /// Inserts or replaces a descriptor, resetting its attributes.
    pub fn register(&self, descriptor: FunctionDescriptor) {
        let name = descriptor.name().to_owned();
        let entry = Entry {
            attributes: FunctionAttributes::for_descriptor(&descriptor),
            descriptor: Arc::new(descriptor),
        };
        if self.write().insert(name.clone(), entry).is_some() {
            debug!(function = %name, "function registration replaced");
        } else {
            debug!(function = %name, "function registered");
        }
    }

    /// Registers a function published by a remote collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidDescriptor`] when the manifest is invalid.
    pub fn register_remote(&self, manifest: RemoteFunctionManifest) -> RegistryResult<()> {
        let descriptor = manifest.into_descriptor()?;
        info!(
            function = %descriptor.name(),
            handle = ?descriptor.remote_handle(),
            "remote function registered"
        );
        self.register(descriptor);
        Ok(())
    }

    /// Registers every binding submitted with `inventory::submit!`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first binding that fails to build.
    pub fn register_collected(&self) -> RegistryResult<usize> {
        let mut count = 0;
        for binding in binding::collected() {
            self.register(binding.build()?);
            count += 1;
        }
        debug!(count, "collected function bindings registered");
        Ok(count)
    }

    /// Flips the active flag, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFunction`] when `name` is not registered.
    pub fn toggle_active(&self, name: &str) -> RegistryResult<bool> {
        let mut inner = self.write();
        let entry = inner.get_mut(name).ok_or_else(|| RegistryError::unknown(name))?;
        entry.attributes.active = !entry.attributes.active;
        info!(function = %name, active = entry.attributes.active, "function activity toggled");
        Ok(entry.attributes.active)
    }

    /// Sets the active flag explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFunction`] when `name` is not registered.
    pub fn set_active(&self, name: &str, active: bool) -> RegistryResult<()> {
        let mut inner = self.write();
        let entry = inner.get_mut(name).ok_or_else(|| RegistryError::unknown(name))?;
        entry.attributes.active = active;
        Ok(())
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns the descriptor registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<FunctionDescriptor>> {
        self.read()
            .get(name)
            .map(|entry| Arc::clone(&entry.descriptor))
    }

    /// Returns the attributes registered under `name`.
    #[must_use]
    pub fn attributes(&self, name: &str) -> Option<FunctionAttributes> {
        self.read().get(name).map(|entry| entry.attributes)
    }

    /// Returns `true` when `name` is registered and active.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.attributes(name).is_some_and(FunctionAttributes::active)
    }

    /// Returns whether `name` requires confirmation before running.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFunction`] when `name` is not registered.
    pub fn confirmation_required(&self, name: &str) -> RegistryResult<bool> {
        self.get(name)
            .map(|descriptor| descriptor.needs_confirmation())
            .ok_or_else(|| RegistryError::unknown(name))
    }

    /// Returns all registered names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Active, non-hidden functions offered in display affordances.
    #[must_use]
    pub fn visible_functions(&self) -> Vec<String> {
        self.names_where(|attributes| attributes.active && !attributes.hidden)
    }

    /// Active functions that produce a visualisation.
    #[must_use]
    pub fn visualization_functions(&self) -> Vec<String> {
        self.names_where(|attributes| attributes.active && attributes.visualization)
    }

    /// Exports every active function, hidden ones included, in registration order.
    #[must_use]
    pub fn describe_all(&self) -> Vec<ToolSchema> {
        self.read()
            .values()
            .filter(|entry| entry.attributes.active)
            .map(|entry| ToolSchema::from_descriptor(&entry.descriptor))
            .collect()
    }

    /// Exports every active function split into chunks of at most `budget`
    /// characters; see [`chunk_tools`].
    #[must_use]
    pub fn describe_chunked(&self, budget: usize) -> Vec<ToolChunk> {
        chunk_tools(self.describe_all(), budget)
    }

    /// Invokes `name` with positional arguments.
    ///
    /// Inactive functions, argument problems, implementation failures,
    /// return-type mismatches and forwarding failures all yield a descriptive
    /// string value instead of an error.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFunction`] when `name` is not registered.
    pub async fn invoke(&self, name: &str, args: Vec<Value>) -> RegistryResult<Value> {
        let (descriptor, attributes) = {
            let inner = self.read();
            let entry = inner.get(name).ok_or_else(|| RegistryError::unknown(name))?;
            (Arc::clone(&entry.descriptor), entry.attributes)
        };

        if !attributes.active {
            debug!(function = %name, "skipping inactive function");
            return Ok(Value::String(inactive_message(name)));
        }

        let args = match bind_arguments(&descriptor, args) {
            Ok(args) => args,
            Err(err) => {
                debug!(function = %name, error = %err, "rejected function arguments");
                return Ok(Value::String(parameter_issue(name, &err)));
            }
        };

        if let Some(handle) = descriptor.remote_handle() {
            let call = RemoteCall::new(name, args, handle.clone());
            return Ok(match self.forward(call).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(function = %name, error = %err, "remote forwarding failed");
                    Value::String(remote_failure(name))
                }
            });
        }

        let Some(function) = descriptor.implementation() else {
            warn!(function = %name, "function has no local implementation");
            return Ok(Value::String(unexpected_error(name)));
        };

        let output = match AssertUnwindSafe(function.call(args)).catch_unwind().await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                warn!(function = %name, error = %err, "function implementation failed");
                return Ok(Value::String(unexpected_error(name)));
            }
            Err(_) => {
                warn!(function = %name, "function implementation panicked");
                return Ok(Value::String(unexpected_error(name)));
            }
        };

        match descriptor.returns() {
            Some(returns) => Ok(match returns.check(output) {
                Ok(output) => output,
                Err(err) => {
                    warn!(function = %name, error = %err, "function returned an undeclared shape");
                    Value::String(parameter_issue(name, &err))
                }
            }),
            None => Ok(output),
        }
    }

    /// Invokes `name` with arguments keyed by parameter name.
    ///
    /// Missing names are passed as `null`; unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownFunction`] when `name` is not registered
    /// and [`RegistryError::MissingParameterName`] when a parameter descriptor
    /// is unnamed.
    pub async fn invoke_named(
        &self,
        name: &str,
        mut args: Map<String, Value>,
    ) -> RegistryResult<Value> {
        let descriptor = self.get(name).ok_or_else(|| RegistryError::unknown(name))?;

        let mut positional = Vec::with_capacity(descriptor.params().len());
        for (index, param) in descriptor.params().iter().enumerate() {
            if param.name().is_empty() {
                return Err(RegistryError::MissingParameterName {
                    function: name.to_owned(),
                    index,
                });
            }
            positional.push(args.remove(param.name()).unwrap_or(Value::Null));
        }

        if !args.is_empty() {
            let ignored: Vec<_> = args.keys().cloned().collect();
            debug!(function = %name, ?ignored, "ignoring undeclared named arguments");
        }

        self.invoke(name, positional).await
    }

    async fn forward(&self, call: RemoteCall) -> Result<Value, ForwardError> {
        let forwarder = self.forwarder.as_ref().ok_or(ForwardError::NotConfigured)?;
        debug!(function = %call.name(), handle = %call.handle(), "forwarding function call");
        forwarder.forward(call).await
    }

    fn names_where(&self, predicate: impl Fn(FunctionAttributes) -> bool) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, entry)| predicate(entry.attributes))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Entry>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Entry>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Coerces every positional argument, then validates the coerced tuple.
fn bind_arguments(
    descriptor: &FunctionDescriptor,
    args: Vec<Value>,
) -> Result<Vec<Value>, FieldError> {
    let params = descriptor.params();
    if args.len() > params.len() {
        return Err(FieldError::new(
            "arguments",
            FieldErrorKind::TooManyArguments {
                expected: params.len(),
                received: args.len(),
            },
        ));
    }

    let mut args = args.into_iter();
    let coerced = params
        .iter()
        .map(|param| param.coerce(args.next().unwrap_or(Value::Null)))
        .collect::<Result<Vec<_>, _>>()?;

    params
        .iter()
        .zip(&coerced)
        .try_for_each(|(param, value)| param.validate(value))?;

    Ok(coerced)
}

fn inactive_message(name: &str) -> String {
    format!("The function \"{name}\" is currently not active.")
}

fn parameter_issue(name: &str, err: &FieldError) -> String {
    format!("There was an issue with the parameters you provided for the function \"{name}\": {err}")
}

fn unexpected_error(name: &str) -> String {
    format!("An unexpected error occurred while calling the function \"{name}\". Please try again.")
}

fn remote_failure(name: &str) -> String {
    format!(
        "An unexpected error occurred while forwarding the function \"{name}\" to its remote host. Please try again."
    )
}
