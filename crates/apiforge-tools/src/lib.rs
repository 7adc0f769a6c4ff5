//! Tool surfaces for LLM agents.
//!
//! Exposes plain async callables and generated API methods as validated,
//! introspectable tools:
//!
//! - [`ToolFunction`] describes a callable explicitly: parameters, doc
//!   block, binding boundary and handler
//! - [`ArgumentModel`] turns that description into a JSON Schema and a
//!   compiled validator
//! - [`ToolRegistry`] lists descriptors and validates then dispatches calls
//! - [`convert`] renders descriptors for OpenAI, MCP, Anthropic and
//!   structured-tool consumers
//! - [`http`] executes generated client methods through a [`Transport`]
//!
//! # Examples
//!
//! ```
//! use apiforge_tools::{ParamDecl, ToolFunction, ToolRegistry, convert};
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register(
//!         ToolFunction::new("lookup", |args| Box::pin(async move { Ok(json!(args)) }))
//!             .doc("Looks up an item.\n\nArgs:\n    item_id (int): Item to look up.")
//!             .param(ParamDecl::new("item_id").typed::<i64>()),
//!     )
//!     .unwrap();
//!
//! let descriptor = registry.descriptor("lookup").unwrap();
//! let schema = &descriptor.argument_schema;
//! assert_eq!(schema["properties"]["item_id"]["type"], "integer");
//! assert_eq!(schema["properties"]["item_id"]["description"], "Item to look up.");
//!
//! let call = convert::to_function_call(descriptor);
//! assert_eq!(call["function"]["name"], "lookup");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod descriptor;
mod dialect;
mod error;
mod function;
mod hints;
mod registry;

pub mod convert;
pub mod http;
pub mod model;

pub use descriptor::ToolDescriptor;
pub use error::{RequestError, Result, ToolError};
pub use function::{BindingBoundary, ParamDecl, ToolFunction, ToolFuture, ToolHandler};
pub use hints::FieldType;
pub use http::{DetachedTransport, HttpRequest, HttpResponse, RequestPayload, Transport};
pub use model::{ArgumentModel, FieldSpec, lenient_decode};
pub use registry::ToolRegistry;
