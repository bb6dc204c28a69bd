//! Descriptor model shared by the function registry and the workflow verifier.
//!
//! A [`Descriptor`] declares the call contract of one parameter or return
//! value. The same tree is rendered into an LLM tool schema with
//! [`Descriptor::describe`] and used to check real argument values with
//! [`Descriptor::check`], which runs boundary coercion ahead of strict
//! validation.

#![warn(missing_docs, clippy::pedantic)]

mod coerce;
mod descriptor;
mod error;
mod validate;

/// Descriptor tree and its per-kind payloads.
pub use descriptor::{
    ArrayDescriptor, Descriptor, EnumDescriptor, FieldDescriptor, ObjectDescriptor, PrimitiveKind,
    describe_fields,
};
/// Construction and value-checking errors.
pub use error::{FieldError, FieldErrorKind, SchemaError, SchemaResult};
/// Helper naming the JSON type of a value, used in mismatch messages.
pub use validate::json_type_name;
