//! Typed workflow document model.
//!
//! These types are what planners emit and executors consume. The verifier
//! itself reads raw JSON so that malformed documents surface as violations
//! rather than deserialisation errors; see
//! [`WorkflowVerifier::verify_document`](crate::WorkflowVerifier::verify_document)
//! for verifying the typed form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered set of function calls plus UI-binding metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// Always `"workflow"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Planner-written summary.
    #[serde(default)]
    pub description: String,
    /// Actions in execution order.
    pub actions: Vec<Action>,
    /// Input and output component bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<WorkflowUi>,
}

impl WorkflowDocument {
    /// Creates a workflow with the supplied actions and no UI metadata.
    #[must_use]
    pub fn new(description: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            kind: "workflow".to_owned(),
            description: description.into(),
            actions,
            ui: None,
        }
    }

    /// Attaches UI metadata.
    #[must_use]
    pub fn with_ui(mut self, ui: WorkflowUi) -> Self {
        self.ui = Some(ui);
        self
    }
}

/// One function call inside a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier, unique within the document.
    pub id: String,
    /// Name of the registered function to call.
    pub tool: String,
    /// Planner-written summary.
    #[serde(default)]
    pub description: String,
    /// Argument values keyed by parameter name.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Run once per element of a referenced array.
    #[serde(default)]
    pub map: bool,
}

impl Action {
    /// Creates an action without parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            description: String::new(),
            parameters: Map::new(),
            map: false,
        }
    }

    /// Adds a parameter value.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Marks the action as mapped over a referenced array.
    #[must_use]
    pub fn mapped(mut self) -> Self {
        self.map = true;
        self
    }
}

/// UI bindings for a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUi {
    /// Form fields that resolve `userInput.*` placeholders.
    #[serde(default)]
    pub input_components: Vec<InputComponent>,
    /// Result displays bound to actions.
    #[serde(default)]
    pub output_components: Vec<OutputComponent>,
}

/// Input field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Single-line text.
    String,
    /// Numeric input.
    Number,
    /// Checkbox.
    Boolean,
    /// Choice among `enumValues`.
    Enum,
    /// Multi-line text.
    Text,
    /// CSV upload.
    Csv,
    /// Repeating group of `subFields`.
    Array,
}

impl InputKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Enum,
        Self::Text,
        Self::Csv,
        Self::Array,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Array => "array",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// A form field, possibly a repeating group of nested fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputComponent {
    /// Placeholder this field resolves, e.g. `userInput.title`.
    pub key: String,
    /// Label shown to the user.
    pub label: String,
    /// Field kind.
    #[serde(rename = "type", alias = "kind")]
    pub kind: InputKind,
    /// Whether the form requires a value.
    #[serde(default)]
    pub required: bool,
    /// Choices for [`InputKind::Enum`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Column names expected in a [`InputKind::Csv`] upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_columns: Option<Vec<String>>,
    /// Nested fields of an [`InputKind::Array`] group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_fields: Option<Vec<InputComponent>>,
}

impl InputComponent {
    /// Creates a field of the given kind.
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: InputKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            enum_values: None,
            expected_columns: None,
            sub_fields: None,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the enum choices.
    #[must_use]
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the expected CSV columns.
    #[must_use]
    pub fn with_expected_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the nested fields of an array group.
    #[must_use]
    pub fn with_sub_fields(mut self, sub_fields: Vec<InputComponent>) -> Self {
        self.sub_fields = Some(sub_fields);
        self
    }
}

/// Result display kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputKind {
    /// Tabular rendering of an array result.
    Table,
    /// Card rendering of an object result.
    DataCard,
}

impl OutputKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 2] = [Self::Table, Self::DataCard];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::DataCard => "dataCard",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Result display bound to one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputComponent {
    /// Action whose output is displayed.
    pub action_id: String,
    /// Display kind.
    pub component: OutputKind,
    /// Renderer-specific properties.
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl OutputComponent {
    /// Creates a display for `action_id`.
    #[must_use]
    pub fn new(action_id: impl Into<String>, component: OutputKind) -> Self {
        Self {
            action_id: action_id.into(),
            component,
            props: Map::new(),
        }
    }
}
