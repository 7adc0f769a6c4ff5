//! Core types, configuration, and errors for apiforge.
//!
//! This crate provides the foundational pieces shared by the schema loader,
//! the client compiler, the tool synthesizer and the CLI.
//!
//! # Architecture
//!
//! - Domain types (`HttpVerb`, `ParamLocation`, `ReturnKind`)
//! - Error hierarchy with operation-scoped vs. fatal classification
//! - `GeneratorConfig`, loadable from `apiforge.toml`
//! - CLI value types (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod types;

pub mod cli;

pub use config::{CONFIG_FILE_NAME, DocgenConfig, GeneratorConfig, GeneratorConfigBuilder};
pub use error::{Error, Result};
pub use types::{HttpVerb, ParamLocation, ReturnKind};
