//! `docgen`: fill in missing documentation blocks with a model.

use super::load_config;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use apiforge_core::cli::{ExitCode, OutputFormat};
use apiforge_docgen::{AnthropicDocWriter, DocgenOptions, document_file};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct FailedFunction {
    function: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct DocgenResult {
    file: String,
    model: String,
    documented: Vec<String>,
    failed: Vec<FailedFunction>,
}

/// Runs the command.
///
/// Returns [`ExitCode::PARTIAL`] when some functions could not be
/// documented; the others are still written.
pub async fn run(
    source: &Path,
    model: Option<String>,
    max_concurrency: Option<usize>,
    config: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let mut docgen = load_config(config.as_deref())?.docgen;
    if let Some(model) = model {
        docgen.model = model;
    }
    if let Some(limit) = max_concurrency {
        docgen.max_concurrency = limit;
    }
    docgen.validate()?;

    let writer = AnthropicDocWriter::from_config(&docgen)?;
    let report = document_file(source, Arc::new(writer), &DocgenOptions::from(&docgen))
        .await
        .with_context(|| format!("failed to document {}", source.display()))?;

    let exit = if report.failed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::PARTIAL
    };
    let result = DocgenResult {
        file: source.display().to_string(),
        model: docgen.model,
        documented: report.documented,
        failed: report
            .failed
            .into_iter()
            .map(|(function, e)| FailedFunction {
                function,
                error: e.to_string(),
            })
            .collect(),
    };
    println!("{}", format_output(&result, output_format)?);
    Ok(exit)
}
