//! OpenAPI document loading for apiforge.
//!
//! Reads JSON or YAML, inlines every local `$ref`, and flattens
//! `allOf`/`oneOf`/`anyOf` so later stages see a plain tree.
//!
//! # Examples
//!
//! ```no_run
//! use apiforge_schema::SchemaDocument;
//!
//! let doc = SchemaDocument::from_path("petstore.yaml")?;
//! for (path, item) in doc.paths() {
//!     println!("{path}: {} verbs", item.len());
//! }
//! # Ok::<(), apiforge_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod document;
mod resolver;

pub use document::{DocumentFormat, SchemaDocument};
pub use resolver::{CIRCULAR_MARKER, MAX_DEPTH, UNRESOLVED_MARKER, find_unresolved, resolve};
