//! Static verification of workflow documents.
//!
//! A workflow is an ordered list of function calls ("actions") plus the UI
//! metadata that binds user input and displays results. The
//! [`WorkflowVerifier`] checks a document against a
//! [`FunctionRegistry`](toolflow_registry::registry::FunctionRegistry) without
//! executing anything and reports every violation it finds.

#![warn(missing_docs, clippy::pedantic)]

pub mod document;
pub mod parameter;
pub mod report;
mod verifier;

pub use document::{
    Action, InputComponent, InputKind, OutputComponent, OutputKind, WorkflowDocument, WorkflowUi,
};
pub use parameter::{ParameterValue, Reference};
pub use report::{VerificationReport, Violation, ViolationKind};
pub use verifier::{VerifyWorkflow, WorkflowVerifier};
