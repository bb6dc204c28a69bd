//! Error definitions for descriptor construction and value checking.

use std::fmt;

use thiserror::Error;

/// Result alias for descriptor construction.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Errors raised while building a descriptor tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Enumerated descriptor was declared without any values.
    #[error("enum descriptor `{name}` must declare at least one value")]
    EmptyEnum {
        /// Name of the offending descriptor.
        name: String,
    },

    /// Array descriptor was given another array as its item type.
    #[error("array descriptor `{name}` cannot use an array as its item type")]
    NestedArray {
        /// Name of the offending descriptor.
        name: String,
    },
}

/// A value failed coercion or validation against a descriptor.
///
/// The `path` locates the failing value inside the argument tree, for
/// example `surveyId`, `questions[2]` or `settings.theme`.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{path}: {kind}")]
pub struct FieldError {
    path: String,
    kind: FieldErrorKind,
}

impl FieldError {
    /// Creates an error for the value located at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns the location of the failing value.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the failure reason.
    #[must_use]
    pub fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }

    /// Returns the reason without the path prefix.
    #[must_use]
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }
}

/// Reasons a value can be rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// A string could not be parsed as a number.
    InvalidNumber {
        /// The rejected input.
        received: String,
    },
    /// A string other than `"true"` or `"false"` was supplied for a boolean.
    InvalidBoolean {
        /// The rejected input.
        received: String,
    },
    /// A string could not be parsed into a JSON array.
    InvalidArray {
        /// Parser or shape failure description.
        reason: String,
    },
    /// The value is not one of the declared enum values.
    InvalidEnumValue {
        /// Declared values, in declaration order.
        expected: Vec<String>,
        /// The rejected input, rendered as JSON.
        received: String,
    },
    /// The JSON type of the value does not match the descriptor.
    TypeMismatch {
        /// Expected JSON type.
        expected: &'static str,
        /// JSON type actually received.
        received: &'static str,
    },
    /// A required value was absent or `null`.
    Required,
    /// More positional arguments than declared parameters.
    TooManyArguments {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied arguments.
        received: usize,
    },
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber { received } => {
                write!(f, "Expected a number, received \"{received}\"")
            }
            Self::InvalidBoolean { received } => {
                write!(f, "Expected \"true\" or \"false\", received \"{received}\"")
            }
            Self::InvalidArray { reason } => write!(f, "Expected an array, {reason}"),
            Self::InvalidEnumValue { expected, received } => {
                let options = expected
                    .iter()
                    .map(|value| format!("'{value}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                write!(
                    f,
                    "Invalid enum value. Expected {options}, received {received}"
                )
            }
            Self::TypeMismatch { expected, received } => {
                write!(f, "Expected {expected}, received {received}")
            }
            Self::Required => f.write_str("Required"),
            Self::TooManyArguments { expected, received } => write!(
                f,
                "Expected at most {expected} arguments, received {received}"
            ),
        }
    }
}
