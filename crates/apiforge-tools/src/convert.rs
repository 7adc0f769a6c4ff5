//! Wire formats for tool descriptors.
//!
//! Pure functions from [`ToolDescriptor`] to the shapes tool-calling
//! protocols expect. None of them touches the registry.

use crate::descriptor::ToolDescriptor;
use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// OpenAI-style function schema.
///
/// # Examples
///
/// ```
/// use apiforge_tools::{ToolDescriptor, convert::to_function_call};
/// use serde_json::json;
///
/// let descriptor = ToolDescriptor {
///     name: "ping".to_string(),
///     summary: "Pings.".to_string(),
///     argument_schema: json!({"type": "object", "properties": {}, "required": []}),
///     output_schema: None,
///     tags: vec![],
/// };
/// let call = to_function_call(&descriptor);
/// assert_eq!(call["type"], "function");
/// assert_eq!(call["function"]["name"], "ping");
/// ```
#[must_use]
pub fn to_function_call(descriptor: &ToolDescriptor) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": descriptor.name,
            "description": descriptor.summary,
            "parameters": descriptor.argument_schema,
        }
    })
}

/// Minimal MCP tool descriptor.
///
/// The output schema is carried only when it describes an object, which is
/// all MCP accepts there.
#[must_use]
pub fn to_mcp_tool(descriptor: &ToolDescriptor) -> Tool {
    let mut tool = Tool::new(
        descriptor.name.clone(),
        descriptor.summary.clone(),
        Arc::new(schema_object(&descriptor.argument_schema)),
    );
    tool.output_schema = descriptor
        .output_schema
        .as_ref()
        .filter(|schema| schema.get("type").and_then(Value::as_str) == Some("object"))
        .map(|schema| Arc::new(schema_object(schema)));
    tool
}

/// Anthropic Messages API tool definition.
#[must_use]
pub fn to_anthropic_tool(descriptor: &ToolDescriptor) -> Value {
    json!({
        "name": descriptor.name,
        "description": descriptor.summary,
        "input_schema": descriptor.argument_schema,
    })
}

/// Framework-native structured tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTool {
    /// Tool name
    pub name: String,
    /// Full summary
    pub description: String,
    /// Argument schema
    pub args_schema: Value,
    /// Result schema, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_schema: Option<Value>,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Errors come back as structured values instead of failures
    pub handle_tool_error: bool,
}

/// Builds the structured tool form.
#[must_use]
pub fn to_structured_tool(descriptor: &ToolDescriptor) -> StructuredTool {
    StructuredTool {
        name: descriptor.name.clone(),
        description: descriptor.summary.clone(),
        args_schema: descriptor.argument_schema.clone(),
        return_schema: descriptor.output_schema.clone(),
        tags: descriptor.tags.clone(),
        handle_tool_error: true,
    }
}

fn schema_object(schema: &Value) -> JsonObject {
    schema.as_object().cloned().unwrap_or_default()
}
