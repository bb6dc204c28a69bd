//! Descriptor tree for parameters and return values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{SchemaError, SchemaResult};

/// Primitive value kinds supported by [`FieldDescriptor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// Integer or floating point number.
    Number,
    /// `true` or `false`.
    Boolean,
}

impl PrimitiveKind {
    /// Returns the JSON Schema type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// Primitive field payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) primitive: PrimitiveKind,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default = "required_by_default")]
    pub(crate) required: bool,
}

impl FieldDescriptor {
    /// Returns the primitive kind.
    #[must_use]
    pub const fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }
}

/// Enumerated string payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) values: Vec<String>,
    #[serde(default = "required_by_default")]
    pub(crate) required: bool,
}

impl EnumDescriptor {
    /// Returns the declared values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns `true` when `candidate` is one of the declared values.
    #[must_use]
    pub fn allows(&self, candidate: &str) -> bool {
        self.values.iter().any(|value| value == candidate)
    }
}

/// Homogeneous array payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayDescriptor {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) item: Box<Descriptor>,
    #[serde(default = "required_by_default")]
    pub(crate) required: bool,
}

impl ArrayDescriptor {
    /// Returns the item descriptor.
    #[must_use]
    pub fn item(&self) -> &Descriptor {
        &self.item
    }
}

/// Object payload with an ordered set of named sub-fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) fields: Vec<Descriptor>,
    #[serde(default = "required_by_default")]
    pub(crate) required: bool,
}

impl ObjectDescriptor {
    /// Returns the declared sub-fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Descriptor] {
        &self.fields
    }

    /// Looks up a sub-field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Descriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Returns the names of all sub-fields in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(Descriptor::name).collect()
    }
}

const fn required_by_default() -> bool {
    true
}

/// Declarative description of a parameter or return value.
///
/// Descriptors own their children, so every descriptor is a finite tree.
/// New descriptors are required; call [`Descriptor::optional`] to relax that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Descriptor {
    /// Primitive string, number or boolean.
    Field(FieldDescriptor),
    /// String restricted to a declared set of values.
    Enum(EnumDescriptor),
    /// Sequence of values sharing one item descriptor.
    Array(ArrayDescriptor),
    /// Named, ordered set of sub-fields.
    Object(ObjectDescriptor),
}

impl Descriptor {
    /// Creates a required primitive descriptor.
    #[must_use]
    pub fn primitive(name: impl Into<String>, primitive: PrimitiveKind) -> Self {
        Self::Field(FieldDescriptor {
            name: name.into(),
            primitive,
            description: String::new(),
            required: true,
        })
    }

    /// Creates a required string descriptor.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::String)
    }

    /// Creates a required number descriptor.
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::Number)
    }

    /// Creates a required boolean descriptor.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::primitive(name, PrimitiveKind::Boolean)
    }

    /// Creates a required enumerated descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyEnum`] when `values` is empty.
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::EmptyEnum { name });
        }
        Ok(Self::Enum(EnumDescriptor {
            name,
            description: String::new(),
            values,
            required: true,
        }))
    }

    /// Creates a required array descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NestedArray`] when `item` is itself an array.
    pub fn array(name: impl Into<String>, item: Descriptor) -> SchemaResult<Self> {
        let name = name.into();
        if matches!(item, Self::Array(_)) {
            return Err(SchemaError::NestedArray { name });
        }
        Ok(Self::Array(ArrayDescriptor {
            name,
            description: String::new(),
            item: Box::new(item),
            required: true,
        }))
    }

    /// Creates a required object descriptor from its ordered sub-fields.
    #[must_use]
    pub fn object(name: impl Into<String>, fields: Vec<Descriptor>) -> Self {
        Self::Object(ObjectDescriptor {
            name: name.into(),
            description: String::new(),
            fields,
            required: true,
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        *self.description_mut() = description.into();
        self
    }

    /// Marks the descriptor as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        *self.required_mut() = false;
        self
    }

    /// Returns the descriptor name. Array item descriptors may be unnamed.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => &field.name,
            Self::Enum(enumeration) => &enumeration.name,
            Self::Array(array) => &array.name,
            Self::Object(object) => &object.name,
        }
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Field(field) => &field.description,
            Self::Enum(enumeration) => &enumeration.description,
            Self::Array(array) => &array.description,
            Self::Object(object) => &object.description,
        }
    }

    /// Returns `true` when a value must be supplied.
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::Field(field) => field.required,
            Self::Enum(enumeration) => enumeration.required,
            Self::Array(array) => array.required,
            Self::Object(object) => object.required,
        }
    }

    /// Returns the object payload when this is an object descriptor.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Checks the construction invariants for the whole tree.
    ///
    /// Descriptors built through the constructors already satisfy them; this
    /// is for trees that arrive deserialised.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found in depth-first order.
    pub fn check_invariants(&self) -> SchemaResult<()> {
        match self {
            Self::Field(_) => Ok(()),
            Self::Enum(enumeration) => {
                if enumeration.values.is_empty() {
                    Err(SchemaError::EmptyEnum {
                        name: enumeration.name.clone(),
                    })
                } else {
                    Ok(())
                }
            }
            Self::Array(array) => {
                if matches!(*array.item, Self::Array(_)) {
                    return Err(SchemaError::NestedArray {
                        name: array.name.clone(),
                    });
                }
                array.item.check_invariants()
            }
            Self::Object(object) => object
                .fields
                .iter()
                .try_for_each(Descriptor::check_invariants),
        }
    }

    /// Renders the descriptor as a JSON Schema fragment for tool exports.
    #[must_use]
    pub fn describe(&self) -> Value {
        match self {
            Self::Field(field) => json!({
                "type": field.primitive.as_str(),
                "description": field.description,
            }),
            Self::Enum(enumeration) => json!({
                "type": "string",
                "description": enumeration.description,
                "enum": enumeration.values,
            }),
            Self::Array(array) => json!({
                "type": "array",
                "description": array.description,
                "items": array.item.describe(),
            }),
            Self::Object(object) => {
                let (properties, required) = describe_fields(&object.fields);
                json!({
                    "type": "object",
                    "description": object.description,
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }

    fn description_mut(&mut self) -> &mut String {
        match self {
            Self::Field(field) => &mut field.description,
            Self::Enum(enumeration) => &mut enumeration.description,
            Self::Array(array) => &mut array.description,
            Self::Object(object) => &mut object.description,
        }
    }

    fn required_mut(&mut self) -> &mut bool {
        match self {
            Self::Field(field) => &mut field.required,
            Self::Enum(enumeration) => &mut enumeration.required,
            Self::Array(array) => &mut array.required,
            Self::Object(object) => &mut object.required,
        }
    }
}

/// Builds the `properties` map and `required` list for a set of fields.
#[must_use]
pub fn describe_fields(fields: &[Descriptor]) -> (Map<String, Value>, Vec<String>) {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name().to_owned(), field.describe());
        if field.is_required() {
            required.push(field.name().to_owned());
        }
    }
    (properties, required)
}
