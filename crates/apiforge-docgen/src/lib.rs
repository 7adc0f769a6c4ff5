//! Model-assisted documentation for TypeScript sources.
//!
//! Finds functions and methods without a `/** */` block, asks a
//! [`DocWriter`] for documentation in the block format `apiforge-docs`
//! parses, and inserts the results in place.
//!
//! # Examples
//!
//! ```no_run
//! use apiforge_core::DocgenConfig;
//! use apiforge_docgen::{AnthropicDocWriter, DocgenOptions, document_file};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> apiforge_docgen::Result<()> {
//! let config = DocgenConfig::default();
//! let writer = AnthropicDocWriter::from_config(&config)?;
//! let report = document_file(
//!     Path::new("client.ts"),
//!     Arc::new(writer),
//!     &DocgenOptions::from(&config),
//! )
//! .await?;
//! println!("documented {} functions", report.documented.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod generate;
mod scanner;
mod writer;

pub use error::{DocgenError, Result};
pub use generate::{DocgenOptions, DocgenReport, document_file, generate_docs};
pub use scanner::{FunctionSite, find_undocumented};
pub use writer::{AnthropicDocWriter, DocWriter, normalize_doc};
