//! Statically submitted function bindings.
//!
//! Host crates can declare functions next to their implementation and have
//! them picked up by [`FunctionRegistry::register_collected`]:
//!
//! ```ignore
//! fn ping() -> RegistryResult<FunctionDescriptor> {
//!     FunctionDescriptor::builder("ping")
//!         .sync_handler(|_| Ok(serde_json::json!("pong")))
//!         .build()
//! }
//!
//! inventory::submit! { FunctionBinding::new(ping) }
//! ```
//!
//! [`FunctionRegistry::register_collected`]: crate::registry::FunctionRegistry::register_collected

use crate::function::FunctionDescriptor;
use crate::registry::RegistryResult;

/// Constructor for a function descriptor, collected at link time.
#[derive(Clone, Copy)]
pub struct FunctionBinding {
    build: fn() -> RegistryResult<FunctionDescriptor>,
}

impl FunctionBinding {
    /// Wraps a descriptor constructor.
    #[must_use]
    pub const fn new(build: fn() -> RegistryResult<FunctionDescriptor>) -> Self {
        Self { build }
    }

    /// Runs the constructor.
    ///
    /// # Errors
    ///
    /// Propagates any error raised while building the descriptor.
    pub fn build(&self) -> RegistryResult<FunctionDescriptor> {
        (self.build)()
    }
}

inventory::collect!(FunctionBinding);

/// Iterates over every binding submitted with `inventory::submit!`.
pub fn collected() -> impl Iterator<Item = &'static FunctionBinding> {
    inventory::iter::<FunctionBinding>.into_iter()
}
