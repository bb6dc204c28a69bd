//! Tool-schema export and size-bounded chunking.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use toolflow_schema::describe_fields;

use crate::function::FunctionDescriptor;

/// One exported tool in the planner-facing format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    kind: String,
    function: FunctionSchema,
}

/// Function body of a [`ToolSchema`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    name: String,
    description: String,
    parameters: ParametersSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    returns: Option<Value>,
}

/// Object schema wrapping the positional parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    kind: String,
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ToolSchema {
    /// Renders the export entry for `descriptor`.
    #[must_use]
    pub fn from_descriptor(descriptor: &FunctionDescriptor) -> Self {
        let (properties, required) = describe_fields(descriptor.params());
        Self {
            kind: "function".to_owned(),
            function: FunctionSchema {
                name: descriptor.name().to_owned(),
                description: descriptor.description().to_owned(),
                parameters: ParametersSchema {
                    kind: "object".to_owned(),
                    properties,
                    required,
                },
                returns: descriptor.returns().map(toolflow_schema::Descriptor::describe),
            },
        }
    }

    /// Returns the exported function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Returns the exported description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.function.description
    }

    /// Returns the parameter property schemas.
    #[must_use]
    pub fn properties(&self) -> &Map<String, Value> {
        &self.function.parameters.properties
    }

    /// Returns the names of required parameters.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.function.parameters.required
    }

    /// Returns the rendered return schema.
    #[must_use]
    pub fn returns(&self) -> Option<&Value> {
        self.function.returns.as_ref()
    }

    /// Character count of the compact JSON encoding.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        serde_json::to_string(self)
            .map(|encoded| encoded.chars().count())
            .unwrap_or_default()
    }
}

/// Ordered group of tools whose combined size respects a budget.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolChunk {
    tools: Vec<ToolSchema>,
}

impl ToolChunk {
    /// Returns the tools in export order.
    #[must_use]
    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    /// Consumes the chunk, returning its tools.
    #[must_use]
    pub fn into_tools(self) -> Vec<ToolSchema> {
        self.tools
    }

    /// Character count of the chunk's compact JSON tool array.
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        export_len(&self.tools)
    }
}

/// Character count of `tools` encoded as a compact JSON array, brackets and
/// separators included.
#[must_use]
pub fn export_len(tools: &[ToolSchema]) -> usize {
    let separators = tools.len().saturating_sub(1);
    EMPTY_ARRAY_LEN + separators + tools.iter().map(ToolSchema::serialized_len).sum::<usize>()
}

const EMPTY_ARRAY_LEN: usize = 2;

/// Splits `tools` into chunks of at most `budget` characters.
///
/// Packing is greedy and order-preserving. A tool larger than the budget on
/// its own is placed alone in an oversized chunk rather than dropped.
#[must_use]
pub fn chunk_tools(tools: Vec<ToolSchema>, budget: usize) -> Vec<ToolChunk> {
    let mut chunks = Vec::new();
    let mut current = ToolChunk::default();
    let mut current_len = EMPTY_ARRAY_LEN;

    for tool in tools {
        let len = tool.serialized_len();
        if !current.tools.is_empty() && current_len + 1 + len > budget {
            chunks.push(std::mem::take(&mut current));
            current_len = EMPTY_ARRAY_LEN;
        }
        if !current.tools.is_empty() {
            current_len += 1;
        }
        current_len += len;
        current.tools.push(tool);
    }

    if !current.tools.is_empty() {
        chunks.push(current);
    }
    chunks
}
