//! `tools`: list the tool descriptors of every API operation.

use super::load_config;
use crate::ToolShape;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use apiforge_codegen::ClientGenerator;
use apiforge_core::cli::{ExitCode, OutputFormat};
use apiforge_schema::SchemaDocument;
use apiforge_tools::{DetachedTransport, ToolDescriptor, ToolRegistry, Transport, convert};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the descriptors of every operation in `schema`, in `shape`.
pub fn describe(schema: &Path, shape: ToolShape, config: Option<&Path>) -> Result<Vec<Value>> {
    let config = load_config(config)?;
    let document = SchemaDocument::from_path(schema)
        .with_context(|| format!("failed to load {}", schema.display()))?;
    let client = ClientGenerator::new()?.generate(&document, &config)?;

    let transport: Arc<dyn Transport> = Arc::new(DetachedTransport);
    let registry = ToolRegistry::from_client(&client, transport);
    registry
        .list_tools()
        .into_iter()
        .map(|descriptor| render(descriptor, shape))
        .collect()
}

fn render(descriptor: &ToolDescriptor, shape: ToolShape) -> Result<Value> {
    Ok(match shape {
        ToolShape::Descriptor => serde_json::to_value(descriptor)?,
        ToolShape::Openai => convert::to_function_call(descriptor),
        ToolShape::Mcp => serde_json::to_value(convert::to_mcp_tool(descriptor))?,
        ToolShape::Anthropic => convert::to_anthropic_tool(descriptor),
        ToolShape::Structured => serde_json::to_value(convert::to_structured_tool(descriptor))?,
    })
}

/// Runs the command.
pub fn run(
    schema: &Path,
    shape: ToolShape,
    config: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let tools = describe(schema, shape, config.as_deref())?;
    tracing::info!("Described {} tools", tools.len());
    println!("{}", format_output(&tools, output_format)?);
    Ok(ExitCode::SUCCESS)
}
