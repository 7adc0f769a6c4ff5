//! Shell completion scripts.

use anyhow::Result;
use apiforge_core::cli::ExitCode;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io;

/// Prints the completion script for `shell` to stdout.
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    tracing::debug!("Generating {shell} completions");
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}
