//! `split`: regroup an already-generated client into segments.
//!
//! Works from the IR sidecar written next to the client, so the original
//! API description is not needed.

use super::file_stem;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use apiforge_codegen::{ClientGenerator, ir_path, load_ir, partition};
use apiforge_core::cli::{ExitCode, OutputFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct SegmentSummary {
    group_key: String,
    class_name: String,
    methods: usize,
}

#[derive(Debug, Serialize)]
struct SplitResult {
    class_name: String,
    segments: Vec<SegmentSummary>,
    root_methods: Vec<String>,
    output_dir: String,
    files: Vec<String>,
}

/// Runs the command.
///
/// `output_dir` defaults to the directory holding `source`.
pub fn run(source: &Path, output_dir: Option<PathBuf>, output_format: OutputFormat) -> Result<ExitCode> {
    let ir = ir_path(source);
    let client = load_ir(&ir).with_context(|| {
        format!(
            "no client IR for {} (expected {}); regenerate the client first",
            source.display(),
            ir.display()
        )
    })?;

    let stem = file_stem(source)?;
    let dir = output_dir.unwrap_or_else(|| {
        source
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });

    let generator = ClientGenerator::new()?;
    let code = generator.files(&client, &stem, true, true)?;
    code.write_to(&dir)
        .with_context(|| format!("failed to write segments to {}", dir.display()))?;

    let layout = partition(&client)?;
    let result = SplitResult {
        class_name: client.class_name.clone(),
        segments: layout
            .segments
            .iter()
            .map(|segment| SegmentSummary {
                group_key: segment.group_key.clone(),
                class_name: segment.class_name.clone(),
                methods: segment.methods.len(),
            })
            .collect(),
        root_methods: layout.root.iter().map(|method| method.name.clone()).collect(),
        output_dir: dir.display().to_string(),
        files: code.files().map(|file| file.path.clone()).collect(),
    };
    println!("{}", format_output(&result, output_format)?);
    Ok(ExitCode::SUCCESS)
}
