//! Tool registry.
//!
//! Holds one immutable [`ArgumentModel`] per registered callable. Calls
//! validate, merge bound values and context, and await the handler
//! directly: no timeout is imposed, and dropping the returned future
//! cancels the callable.
//!
//! # Examples
//!
//! ```
//! use apiforge_tools::{ParamDecl, ToolFunction, ToolRegistry};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let mut registry = ToolRegistry::new().with_context("tenant", json!("acme"));
//! registry
//!     .register(
//!         ToolFunction::new("echo", |args| Box::pin(async move { Ok(json!(args)) }))
//!             .doc("Echoes.\n\nArgs:\n    text (string): Text to echo.")
//!             .param(ParamDecl::new("text")),
//!     )
//!     .unwrap();
//!
//! let result = registry.call_tool("echo", json!({"text": "hi"})).await.unwrap();
//! assert_eq!(result, json!({"text": "hi", "tenant": "acme"}));
//! # });
//! ```

use crate::descriptor::ToolDescriptor;
use crate::error::{Result, ToolError};
use crate::function::{ToolFunction, ToolHandler};
use crate::model::ArgumentModel;
use apiforge_docs::parse_doc;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    model: Arc<ArgumentModel>,
    bound: Map<String, Value>,
    handler: ToolHandler,
}

/// Registry of callable tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    context: Map<String, Value>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field(
                "tools",
                &self.tools.iter().map(|tool| &tool.descriptor.name).collect::<Vec<_>>(),
            )
            .field("context", &self.context)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value injected into every call.
    ///
    /// Context never overrides a validated argument of the same name.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Context injected into every call.
    #[must_use]
    pub const fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Registers a callable and returns its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] if the callable cannot be
    /// modelled or its name is already registered.
    pub fn register(&mut self, function: ToolFunction) -> Result<&ToolDescriptor> {
        if self.descriptor(function.name()).is_some() {
            return Err(ToolError::Configuration {
                tool: function.name().to_string(),
                reason: "a tool with this name is already registered".to_string(),
            });
        }

        let doc = parse_doc(function.doc_text());
        let model = ArgumentModel::build(&function, &doc)?;
        let descriptor = ToolDescriptor::build(&function, &model, &doc);
        let bound = function
            .bound_arguments()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        tracing::debug!(tool = %descriptor.name, "Registered tool");
        self.tools.push(RegisteredTool {
            descriptor,
            model: Arc::new(model),
            bound,
            handler: function.handler(),
        });

        let index = self.tools.len() - 1;
        Ok(&self.tools[index].descriptor)
    }

    /// Descriptors of every registered tool, in registration order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|tool| &tool.descriptor).collect()
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.find(name).map(|tool| &tool.descriptor)
    }

    /// Looks up the argument model of a tool.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<Arc<ArgumentModel>> {
        self.find(name).map(|tool| Arc::clone(&tool.model))
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|tool| tool.descriptor.name == name)
    }

    /// Validates `arguments` and invokes the tool.
    ///
    /// `null` counts as an empty argument object.
    ///
    /// # Errors
    ///
    /// - [`ToolError::NotFound`] for unknown tools
    /// - [`ToolError::InvalidArguments`] if validation fails; the callable is
    ///   not invoked
    /// - whatever the callable itself returns
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let tool = self.find(name).ok_or_else(|| ToolError::NotFound {
            name: name.to_string(),
        })?;

        let raw = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ToolError::InvalidArguments {
                    tool: name.to_string(),
                    errors: vec![format!("arguments must be a JSON object, got {other}")],
                });
            }
        };

        let validated = tool.model.validate(raw)?;

        let mut call = tool.bound.clone();
        call.extend(validated);
        for (key, value) in &self.context {
            call.entry(key.clone()).or_insert_with(|| value.clone());
        }

        tracing::debug!(tool = %name, "Calling tool");
        let result = (tool.handler)(call).await;
        if let Err(e) = &result {
            tracing::debug!(tool = %name, "Tool call failed: {e}");
        }
        result
    }

    /// Like [`call_tool`](Self::call_tool), but never fails: returns
    /// `{"result": ...}` on success and the structured error otherwise.
    pub async fn call_tool_structured(&self, name: &str, arguments: Value) -> Value {
        match self.call_tool(name, arguments).await {
            Ok(result) => json!({ "result": result }),
            Err(e) => e.to_structured(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ParamDecl;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo() -> ToolFunction {
        ToolFunction::new("echo", |args| Box::pin(async move { Ok(Value::Object(args)) }))
            .doc("Echoes.\n\nArgs:\n    text (string): Text.\n    times (integer): Repeats.")
            .param(ParamDecl::new("text"))
            .param(ParamDecl::new("times").with_default(json!(1)))
    }

    #[tokio::test]
    async fn test_call_fills_defaults() {
        let mut registry = ToolRegistry::new();
        registry.register(echo()).unwrap();

        let result = registry.call_tool("echo", json!({"text": "hi"})).await.unwrap();
        assert_eq!(result, json!({"text": "hi", "times": 1}));
    }

    #[tokio::test]
    async fn test_invalid_arguments_skip_the_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let function = ToolFunction::new("count", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(Value::Null) })
        })
        .doc("Args:\n    n (integer): N.")
        .param(ParamDecl::new("n"));

        let mut registry = ToolRegistry::new();
        registry.register(function).unwrap();

        let err = registry.call_tool("count", json!({"n": "many"})).await.unwrap_err();
        assert!(err.is_invalid_arguments());
        let err = registry.call_tool("count", json!([1])).await.unwrap_err();
        assert!(err.is_invalid_arguments());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        registry.call_tool("count", json!({"n": 3})).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_failure_is_distinct() {
        let function = ToolFunction::new("boom", |_| {
            Box::pin(async { Err(ToolError::failed("exploded")) })
        });
        let mut registry = ToolRegistry::new();
        registry.register(function).unwrap();

        let structured = registry.call_tool_structured("boom", Value::Null).await;
        assert_eq!(structured["error"]["kind"], "failed");
        assert_eq!(structured["error"]["message"], "tool failed: exploded");
    }

    #[tokio::test]
    async fn test_bound_values_and_context_reach_the_handler() {
        let function = ToolFunction::new("post", |args| Box::pin(async move { Ok(Value::Object(args)) }))
            .param(ParamDecl::new("channel"))
            .param(ParamDecl::new("text"))
            .bind([json!("general")]);
        let mut registry = ToolRegistry::new()
            .with_context("user", json!("u1"))
            .with_context("text", json!("ignored"));
        let descriptor = registry.register(function).unwrap();
        assert_eq!(descriptor.argument_schema["required"], json!(["text"]));

        let result = registry.call_tool("post", json!({"text": "hello"})).await.unwrap();
        assert_eq!(
            result,
            json!({"channel": "general", "text": "hello", "user": "u1"})
        );
    }

    #[tokio::test]
    async fn test_unknown_and_duplicate_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(echo()).unwrap();
        assert!(registry.register(echo()).unwrap_err().is_configuration());
        assert_eq!(registry.len(), 1);

        let err = registry.call_tool("missing", json!({})).await.unwrap_err();
        assert!(err.is_not_found());
        let structured = registry.call_tool_structured("missing", json!({})).await;
        assert_eq!(structured["error"]["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_the_model() {
        let mut registry = ToolRegistry::new();
        registry.register(echo()).unwrap();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry
                        .call_tool("echo", json!({"text": format!("t{i}"), "times": i}))
                        .await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result["times"], json!(i));
        }
    }
}
