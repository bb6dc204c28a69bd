//! Function registration, invocation and tool-schema export.
//!
//! Host code builds [`function::FunctionDescriptor`]s and registers them with a
//! [`registry::FunctionRegistry`]. The registry is the only path through which
//! a function is invoked: arguments are coerced and validated against the
//! declared parameters, failures come back as plain strings suitable for an
//! LLM tool loop, and functions owned by another process are forwarded
//! through a [`remote::RemoteForwarder`].

#![warn(missing_docs, clippy::pedantic)]

pub mod binding;
pub mod export;
pub mod function;
pub mod registry;
pub mod remote;
