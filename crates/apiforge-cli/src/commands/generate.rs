//! `generate`: compile an API description into a TypeScript client.
//!
//! Without an output path the single-file client is printed to stdout.
//! With one, the client (or the split layout) is written beside the IR
//! sidecar that `split` reads later.

use super::{file_stem, load_config};
use crate::formatters::format_output;
use anyhow::{Context, Result};
use apiforge_codegen::ClientGenerator;
use apiforge_core::cli::{ExitCode, OutputFormat};
use apiforge_schema::SchemaDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Arguments of the `generate` command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// OpenAPI document, JSON or YAML
    pub schema: PathBuf,
    /// Client file to write, e.g. `out/petstore.ts`
    pub output: Option<PathBuf>,
    /// Overrides the class name
    pub class_name: Option<String>,
    /// Overrides the base URL
    pub base_url: Option<String>,
    /// Split into segments
    pub split: bool,
    /// Skip the IR sidecar
    pub no_ir: bool,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GenerationResult {
    class_name: String,
    methods: usize,
    split: bool,
    output_dir: String,
    files: Vec<String>,
}

/// Runs the command.
pub fn run(options: &GenerateOptions, output_format: OutputFormat) -> Result<ExitCode> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(class_name) = &options.class_name {
        config.class_name = Some(class_name.clone());
    }
    if let Some(base_url) = &options.base_url {
        config.base_url = Some(base_url.clone());
    }
    config.split |= options.split;
    config.emit_ir &= !options.no_ir;

    let document = SchemaDocument::from_path(&options.schema)
        .with_context(|| format!("failed to load {}", options.schema.display()))?;
    let generator = ClientGenerator::new()?;
    let client = generator.generate(&document, &config)?;

    let Some(output) = &options.output else {
        if config.split {
            tracing::warn!("Splitting needs an output path; printing a single file instead");
        }
        print!("{}", generator.render(&client)?);
        return Ok(ExitCode::SUCCESS);
    };

    let stem = file_stem(output)?;
    let dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let code = generator.files(&client, &stem, config.split, config.emit_ir)?;
    code.write_to(dir)
        .with_context(|| format!("failed to write client to {}", dir.display()))?;
    tracing::info!("Wrote {} files to {}", code.file_count(), dir.display());

    let result = GenerationResult {
        class_name: client.class_name.clone(),
        methods: client.methods.len(),
        split: config.split,
        output_dir: dir.display().to_string(),
        files: code.files().map(|file| file.path.clone()).collect(),
    };
    println!("{}", format_output(&result, output_format)?);
    Ok(ExitCode::SUCCESS)
}
