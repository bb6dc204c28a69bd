//! Strict validation of native JSON values.

use serde_json::Value;

use crate::descriptor::{Descriptor, PrimitiveKind};
use crate::error::{FieldError, FieldErrorKind};

/// Returns the JSON type name of `value`.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Descriptor {
    /// Validates an already-coerced value.
    ///
    /// `null` is accepted for optional descriptors. Object values are not
    /// deep-validated: only their enum and array sub-fields are checked.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] found.
    pub fn validate(&self, value: &Value) -> Result<(), FieldError> {
        self.validate_at(value, &self.root_path())
    }

    pub(crate) fn validate_at(&self, value: &Value, path: &str) -> Result<(), FieldError> {
        if value.is_null() {
            return if self.is_required() {
                Err(FieldError::new(path, FieldErrorKind::Required))
            } else {
                Ok(())
            };
        }

        match self {
            Self::Field(field) => {
                let matches = match field.primitive() {
                    PrimitiveKind::String => value.is_string(),
                    PrimitiveKind::Number => value.is_number(),
                    PrimitiveKind::Boolean => value.is_boolean(),
                };
                if matches {
                    Ok(())
                } else {
                    Err(mismatch(path, field.primitive().as_str(), value))
                }
            }
            Self::Enum(enumeration) => match value.as_str() {
                Some(candidate) if enumeration.allows(candidate) => Ok(()),
                _ => Err(FieldError::new(
                    path,
                    FieldErrorKind::InvalidEnumValue {
                        expected: enumeration.values().to_vec(),
                        received: value.to_string(),
                    },
                )),
            },
            Self::Array(array) => {
                let Some(items) = value.as_array() else {
                    return Err(mismatch(path, "array", value));
                };
                items.iter().enumerate().try_for_each(|(index, item)| {
                    array.item().validate_at(item, &format!("{path}[{index}]"))
                })
            }
            Self::Object(object) => {
                let Some(map) = value.as_object() else {
                    return Ok(());
                };
                for field in object.fields() {
                    if !matches!(field, Self::Enum(_) | Self::Array(_)) {
                        continue;
                    }
                    if let Some(child) = map.get(field.name()) {
                        field.validate_at(child, &format!("{path}.{}", field.name()))?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn mismatch(path: &str, expected: &'static str, value: &Value) -> FieldError {
    FieldError::new(
        path,
        FieldErrorKind::TypeMismatch {
            expected,
            received: json_type_name(value),
        },
    )
}
