//! Boundary coercion ahead of strict validation.
//!
//! Arguments often arrive from a form or a CSV import where every value is
//! text. Coercion turns `"42"`, `"true"` and `"[1, 2]"` into their native JSON
//! forms so that [`Descriptor::validate`] only ever sees native values.

use serde_json::{Number, Value};

use crate::descriptor::{Descriptor, PrimitiveKind};
use crate::error::{FieldError, FieldErrorKind};
use crate::validate::json_type_name;

impl Descriptor {
    /// Converts string-encoded values into the native representation the
    /// descriptor expects. Values that are already native, `null`, or of an
    /// unrelated type pass through untouched and are left to validation.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] when a string cannot be read as the declared
    /// number, boolean or array.
    pub fn coerce(&self, value: Value) -> Result<Value, FieldError> {
        self.coerce_at(value, &self.root_path())
    }

    /// Coerces and then strictly validates `value`, returning the coerced form.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] raised by either step.
    pub fn check(&self, value: Value) -> Result<Value, FieldError> {
        let path = self.root_path();
        let coerced = self.coerce_at(value, &path)?;
        self.validate_at(&coerced, &path)?;
        Ok(coerced)
    }

    pub(crate) fn root_path(&self) -> String {
        if self.name().is_empty() {
            "value".to_owned()
        } else {
            self.name().to_owned()
        }
    }

    pub(crate) fn coerce_at(&self, value: Value, path: &str) -> Result<Value, FieldError> {
        if value.is_null() {
            return Ok(value);
        }

        match self {
            Self::Field(field) => coerce_primitive(field.primitive(), value, path),
            Self::Enum(_) => Ok(value),
            Self::Array(array) => {
                let items = match value {
                    Value::Array(items) => items,
                    Value::String(text) => parse_array(&text, path)?,
                    other => return Ok(other),
                };
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| array.item().coerce_at(item, &format!("{path}[{index}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Self::Object(object) => {
                let Value::Object(mut map) = value else {
                    return Ok(value);
                };
                for field in object.fields() {
                    if !matches!(field, Self::Array(_)) {
                        continue;
                    }
                    if let Some(slot) = map.get_mut(field.name()) {
                        let child = format!("{path}.{}", field.name());
                        *slot = field.coerce_at(slot.take(), &child)?;
                    }
                }
                Ok(Value::Object(map))
            }
        }
    }
}

fn coerce_primitive(kind: PrimitiveKind, value: Value, path: &str) -> Result<Value, FieldError> {
    match (kind, value) {
        (PrimitiveKind::Number, Value::String(text)) => parse_number(&text)
            .map(Value::Number)
            .ok_or_else(|| {
                FieldError::new(path, FieldErrorKind::InvalidNumber { received: text })
            }),
        (PrimitiveKind::Boolean, Value::String(text)) => match text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(FieldError::new(
                path,
                FieldErrorKind::InvalidBoolean { received: text },
            )),
        },
        (_, other) => Ok(other),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Number::from(integer));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

fn parse_array(text: &str, path: &str) -> Result<Vec<Value>, FieldError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(FieldError::new(
            path,
            FieldErrorKind::InvalidArray {
                reason: format!("received {}", json_type_name(&other)),
            },
        )),
        Err(err) => Err(FieldError::new(
            path,
            FieldErrorKind::InvalidArray {
                reason: format!("could not parse \"{text}\": {err}"),
            },
        )),
    }
}
