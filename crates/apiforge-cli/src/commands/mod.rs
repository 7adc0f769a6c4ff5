//! Subcommand implementations.
//!
//! Each command builds a serializable result and prints it through
//! [`crate::formatters`], except where the command's output is source code.

pub mod completions;
pub mod docgen;
pub mod generate;
pub mod split;
pub mod tools;

use anyhow::{Context, Result};
use apiforge_core::GeneratorConfig;
use std::path::Path;

/// Loads the effective configuration for a command.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<GeneratorConfig> {
    GeneratorConfig::discover(explicit).context("failed to load configuration")
}

/// File stem used for generated files, e.g. `petstore` for `out/petstore.ts`.
pub(crate) fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a file name from {}", path.display()))
}
