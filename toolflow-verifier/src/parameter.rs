//! Classification of action parameter values.

use serde_json::Value;

const USER_INPUT_PREFIX: &str = "userInput.";
const MAPPED_SUFFIX: &str = "[*]";

/// Reference to the output of another action: `<actionId>.<fieldPath>` or
/// `<actionId>[*].<fieldPath>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reference<'a> {
    action_id: &'a str,
    mapped: bool,
    path: &'a str,
}

impl<'a> Reference<'a> {
    /// Parses `text` as a reference. Placeholders and numeric strings such as
    /// `"2.5"` are never references.
    #[must_use]
    pub fn parse(text: &'a str) -> Option<Self> {
        if text.starts_with(USER_INPUT_PREFIX) || text.trim().parse::<f64>().is_ok() {
            return None;
        }

        let (head, path) = text.split_once('.')?;
        let (action_id, mapped) = match head.strip_suffix(MAPPED_SUFFIX) {
            Some(action_id) => (action_id, true),
            None => (head, false),
        };

        let valid_id = !action_id.is_empty()
            && action_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
        let valid_path = !path.is_empty()
            && !path.starts_with('.')
            && path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '[' | ']' | '*'));

        (valid_id && valid_path).then_some(Self {
            action_id,
            mapped,
            path,
        })
    }

    /// Returns the referenced action id.
    #[must_use]
    pub const fn action_id(&self) -> &'a str {
        self.action_id
    }

    /// Returns `true` for per-element (`[*]`) references.
    #[must_use]
    pub const fn mapped(&self) -> bool {
        self.mapped
    }

    /// Returns the field path after the action id.
    #[must_use]
    pub const fn path(&self) -> &'a str {
        self.path
    }

    /// Returns the first path segment without any index suffix.
    #[must_use]
    pub fn leading_field(&self) -> &'a str {
        let segment = self.path.split('.').next().unwrap_or(self.path);
        segment.split('[').next().unwrap_or(segment)
    }
}

/// How a parameter value is resolved at execution time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterValue<'a> {
    /// `userInput.<field>`, filled in from a form.
    Placeholder(&'a str),
    /// Output of an earlier action.
    Reference(Reference<'a>),
    /// `generate` / `transform` directive resolved by the executor.
    Directive(&'a Value),
    /// Literal value checked against the parameter descriptor.
    Literal(&'a Value),
}

impl<'a> ParameterValue<'a> {
    /// Classifies a raw parameter value.
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(text) if text.starts_with(USER_INPUT_PREFIX) => Self::Placeholder(text),
            Value::String(text) => Reference::parse(text).map_or(Self::Literal(value), Self::Reference),
            Value::Object(map) if is_directive(map) => Self::Directive(value),
            _ => Self::Literal(value),
        }
    }

    /// Returns `true` when static type checking does not apply.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

fn is_directive(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("generate")
        || map.contains_key("transform")
        || matches!(
            map.get("type").and_then(Value::as_str),
            Some("generate" | "transform")
        )
}

/// Collects every `userInput.*` string inside `value`, in document order.
pub fn collect_placeholders<'a>(value: &'a Value, found: &mut Vec<&'a str>) {
    match value {
        Value::String(text) if text.starts_with(USER_INPUT_PREFIX) => found.push(text),
        Value::Array(items) => {
            for item in items {
                collect_placeholders(item, found);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_placeholders(item, found);
            }
        }
        _ => {}
    }
}

/// Reduces a per-row placeholder such as `userInput.csvData[*].email` to the
/// input component key it is resolved from (`userInput.csvData`).
#[must_use]
pub fn placeholder_key(placeholder: &str) -> &str {
    placeholder
        .find('[')
        .map_or(placeholder, |index| &placeholder[..index])
}
