//! apiforge CLI library.
//!
//! Command implementations and output formatters, kept in a library so
//! integration tests can drive them without spawning the binary.

#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

use clap::ValueEnum;

pub mod commands;
pub mod formatters;

/// Wire shape printed by the `tools` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ToolShape {
    /// Protocol-neutral descriptor
    #[default]
    Descriptor,
    /// OpenAI-style function schema
    Openai,
    /// MCP tool
    Mcp,
    /// Anthropic Messages API tool
    Anthropic,
    /// Structured tool with error handling
    Structured,
}
