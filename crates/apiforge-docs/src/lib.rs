//! Structured documentation blocks for generated clients and tools.
//!
//! One block format is shared by everything in apiforge: the client
//! generator writes it, the tool synthesizer reads it back to describe
//! parameters, and `docgen` fills it in for functions that lack one.
//!
//! # Examples
//!
//! ```
//! use apiforge_docs::{parse_doc, render_doc};
//!
//! let doc = parse_doc("List pets.\n\nArgs:\n    limit (integer): Page size.\n\nTags:\n    pet");
//! assert_eq!(doc.args[0].name, "limit");
//! assert_eq!(parse_doc(&render_doc(&doc)), doc);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod comment;
mod parser;
mod render;
mod types;

pub use comment::{strip_block_comment, to_block_comment};
pub use parser::parse_doc;
pub use render::{WRAP_WIDTH, render_doc};
pub use types::{ArgDoc, ParsedDoc, RaiseDoc};
