//! Explicit callable descriptions.
//!
//! Rust has no runtime signature introspection, so a callable is described
//! up front: its name, documentation block, ordered parameters, an optional
//! return schema, how many leading parameters are already bound, and the
//! async handler that runs it.
//!
//! # Examples
//!
//! ```
//! use apiforge_tools::{ParamDecl, ToolFunction};
//! use serde_json::json;
//!
//! let add = ToolFunction::new("add", |args| {
//!     Box::pin(async move {
//!         let a = args.get("a").and_then(|v| v.as_i64()).unwrap_or_default();
//!         let b = args.get("b").and_then(|v| v.as_i64()).unwrap_or_default();
//!         Ok(json!(a + b))
//!     })
//! })
//! .doc("Adds two numbers.\n\nArgs:\n    a (integer): First operand.\n    b (integer): Second operand.")
//! .param(ParamDecl::new("a"))
//! .param(ParamDecl::new("b").with_default(json!(0)));
//!
//! assert_eq!(add.name(), "add");
//! assert_eq!(add.params().len(), 2);
//! ```

use crate::error::ToolError;
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a tool handler.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send>>;

/// Async handler invoked with the final argument map.
///
/// The map holds bound values, validated arguments with defaults filled,
/// and registry context.
pub type ToolHandler = Arc<dyn Fn(Map<String, Value>) -> ToolFuture + Send + Sync>;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamDecl {
    /// Parameter name
    pub name: String,
    /// Declared JSON Schema; wins over documentation hints
    pub schema: Option<Value>,
    /// Default value; its presence makes the parameter optional
    pub default: Option<Value>,
    /// Field title; the name when absent
    pub title: Option<String>,
}

impl ParamDecl {
    /// Declares an untyped parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares the parameter's type with an explicit schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Declares the parameter's type from a Rust type.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiforge_tools::ParamDecl;
    ///
    /// let param = ParamDecl::new("item_id").typed::<i64>();
    /// assert_eq!(param.schema.unwrap()["type"], "integer");
    /// ```
    #[must_use]
    pub fn typed<T: JsonSchema>(self) -> Self {
        let mut schema = schemars::schema_for!(T).to_value();
        if let Value::Object(object) = &mut schema {
            // Type names are not field titles.
            object.remove("$schema");
            object.remove("title");
        }
        self.with_schema(schema)
    }

    /// Sets a default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the field title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Leading parameters already bound by partial application.
///
/// Bound parameters are excluded from the argument model; their values are
/// passed to the handler on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingBoundary {
    values: Vec<Value>,
}

impl BindingBoundary {
    /// Number of bound leading parameters.
    #[must_use]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Bound values in parameter order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A callable described for tool exposure.
#[derive(Clone)]
pub struct ToolFunction {
    name: String,
    doc: String,
    params: Vec<ParamDecl>,
    returns: Option<Value>,
    boundary: BindingBoundary,
    handler: ToolHandler,
}

impl fmt::Debug for ToolFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("boundary", &self.boundary)
            .finish_non_exhaustive()
    }
}

impl ToolFunction {
    /// Creates a callable with no parameters and no documentation.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Map<String, Value>) -> ToolFuture + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            doc: String::new(),
            params: Vec::new(),
            returns: None,
            boundary: BindingBoundary::default(),
            handler: Arc::new(handler),
        }
    }

    /// Sets the documentation block.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Declares the return schema.
    #[must_use]
    pub fn returns(mut self, schema: Value) -> Self {
        self.returns = Some(schema);
        self
    }

    /// Declares the return schema from a Rust type.
    #[must_use]
    pub fn returns_type<T: JsonSchema>(self) -> Self {
        let mut schema = schemars::schema_for!(T).to_value();
        if let Value::Object(object) = &mut schema {
            object.remove("$schema");
        }
        self.returns(schema)
    }

    /// Binds the next leading parameters to fixed values.
    ///
    /// Binding more values than there are parameters is reported when the
    /// tool is built.
    #[must_use]
    pub fn bind(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.boundary.values.extend(values);
        self
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation block text.
    #[must_use]
    pub fn doc_text(&self) -> &str {
        &self.doc
    }

    /// All declared parameters, bound ones included.
    #[must_use]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    /// Declared return schema.
    #[must_use]
    pub const fn return_schema(&self) -> Option<&Value> {
        self.returns.as_ref()
    }

    /// The binding boundary.
    #[must_use]
    pub const fn boundary(&self) -> &BindingBoundary {
        &self.boundary
    }

    /// Bound parameter names paired with their values.
    pub fn bound_arguments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params
            .iter()
            .zip(self.boundary.values())
            .map(|(param, value)| (param.name.as_str(), value))
    }

    /// Parameters callers supply, after the binding boundary.
    #[must_use]
    pub fn free_params(&self) -> &[ParamDecl] {
        self.params
            .get(self.boundary.count()..)
            .unwrap_or_default()
    }

    pub(crate) fn handler(&self) -> ToolHandler {
        Arc::clone(&self.handler)
    }
}
