//! Tool descriptors.

use crate::function::ToolFunction;
use crate::hints::FieldType;
use crate::model::ArgumentModel;
use apiforge_docs::ParsedDoc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol-neutral description of one tool.
///
/// Derived deterministically from a callable and its documentation; the
/// wire converters in [`crate::convert`] turn it into concrete formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,
    /// Summary from the documentation block
    pub summary: String,
    /// JSON Schema of the arguments object
    pub argument_schema: Value,
    /// JSON Schema of the result, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Classification tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolDescriptor {
    /// Builds the descriptor for a callable.
    #[must_use]
    pub fn build(function: &ToolFunction, model: &ArgumentModel, doc: &ParsedDoc) -> Self {
        Self {
            name: function.name().to_string(),
            summary: doc.summary.clone(),
            argument_schema: model.json_schema(),
            output_schema: function
                .return_schema()
                .cloned()
                .or_else(|| returns_hint_schema(&doc.returns)),
            tags: doc.tags.clone(),
        }
    }

    /// Returns the first paragraph of the summary on one line.
    #[must_use]
    pub fn short_description(&self) -> String {
        self.summary
            .split("\n\n")
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Maps a `hint: description` returns entry to a schema.
fn returns_hint_schema(returns: &str) -> Option<Value> {
    let (hint, _) = returns.split_once(':')?;
    match FieldType::from_hint(hint) {
        FieldType::Untyped => None,
        field_type => Some(field_type.schema()),
    }
}
