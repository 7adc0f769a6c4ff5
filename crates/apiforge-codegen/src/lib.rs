//! OpenAPI to TypeScript client compiler.
//!
//! Turns a resolved [`SchemaDocument`](apiforge_schema::SchemaDocument) into
//! a typed TypeScript client whose methods mirror the API's operations.
//!
//! # Architecture
//!
//! ```text
//! SchemaDocument → extractor → naming → render → GeneratedClient (IR)
//!                                                   │
//!                                  ┌────────────────┴───────────────┐
//!                                  ▼                                ▼
//!                        ClientGenerator::render          segments::partition
//!                          (single file)                 (root + segments/*.ts)
//! ```
//!
//! The IR serializes to JSON, so a client can be split again later without
//! the source document.
//!
//! # Examples
//!
//! ```no_run
//! use apiforge_codegen::ClientGenerator;
//! use apiforge_core::GeneratorConfig;
//! use apiforge_schema::SchemaDocument;
//!
//! let document = SchemaDocument::from_path("petstore.yaml")?;
//! let generator = ClientGenerator::new()?;
//! let client = generator.generate(&document, &GeneratorConfig::default())?;
//!
//! let code = generator.files(&client, "petstore", true, true)?;
//! code.write_to(std::path::Path::new("out"))?;
//! # Ok::<(), apiforge_core::Error>(())
//! ```
//!
//! # Features
//!
//! - `parallel`: render operations on the rayon thread pool

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod ir;
mod types;

pub mod extractor;
pub mod generator;
pub mod naming;
pub mod render;
pub mod segments;
pub mod template_engine;
pub mod typescript;

pub use generator::{ClientGenerator, IR_EXTENSION, ir_path, load_ir, to_ir_json};
pub use ir::{
    BodyShape, Binding, GeneratedClient, GeneratedMethod, ParameterSpec, PathMarker, RequestPlan,
};
pub use segments::{Partition, Segment, partition};
pub use types::{GeneratedCode, GeneratedFile};
