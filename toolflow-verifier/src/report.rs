//! Verification verdicts.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Category of a workflow violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Document or action is not shaped like a workflow.
    InvalidShape,
    /// Action has no usable string id.
    InvalidActionId,
    /// Two actions share an id.
    DuplicateActionId,
    /// Action names a tool that is not registered.
    UnknownTool,
    /// Required tool parameter is absent.
    MissingRequiredParameter,
    /// Literal parameter value failed validation.
    InvalidParameterValue,
    /// Reference to a missing or later action, or to an undeclared field.
    InvalidActionReference,
    /// Input component is structurally invalid.
    MalformedUiComponent,
    /// A `userInput.*` placeholder has no matching input component.
    MissingInputComponent,
    /// Output component is bound to an action that does not exist.
    UnknownOutputAction,
}

/// One problem found in a workflow document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    kind: ViolationKind,
    message: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the violation category.
    #[must_use]
    pub const fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of verifying one document, with violations in discovery order.
///
/// Serialises as `{ "valid": bool, "errors": [string] }`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationReport {
    violations: Vec<Violation>,
}

impl VerificationReport {
    /// Returns `true` when no violation was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns every violation in discovery order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the violation messages in discovery order.
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        self.violations.iter().map(Violation::message).collect()
    }

    /// Returns `true` when at least one violation of `kind` was recorded.
    #[must_use]
    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|violation| violation.kind == kind)
    }

    pub(crate) fn push(&mut self, kind: ViolationKind, message: impl Into<String>) {
        self.violations.push(Violation::new(kind, message));
    }
}

impl Serialize for VerificationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("VerificationReport", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors())?;
        state.end()
    }
}
