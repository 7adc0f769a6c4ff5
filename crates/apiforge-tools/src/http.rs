//! Executing generated API methods.
//!
//! A [`RequestPlan`] from the client IR is the structured form of a
//! generated method body. [`invoke`] runs it against a [`Transport`]: the
//! same presence checks, path substitution, payload assembly and tolerant
//! decoding the emitted TypeScript performs. [`operation_tool`] wraps a
//! generated method as a [`ToolFunction`] so API operations register like
//! any other callable.

use crate::error::RequestError;
use crate::function::{ParamDecl, ToolFunction, ToolFuture};
use crate::registry::ToolRegistry;
use apiforge_codegen::{BodyShape, Binding, GeneratedClient, GeneratedMethod, RequestPlan};
use apiforge_core::HttpVerb;
use apiforge_docs::render_doc;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Write;
use std::sync::Arc;

/// Request body ready for dispatch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestPayload {
    /// No body
    #[default]
    None,
    /// JSON document
    Json(Value),
    /// URL-encoded form fields
    Form(Map<String, Value>),
    /// Multipart form
    Multipart {
        /// Plain fields
        fields: Map<String, Value>,
        /// File fields; a value is one file or an array of files
        files: Map<String, Value>,
    },
    /// Opaque content
    Raw(Value),
}

/// Fully assembled request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP verb
    pub method: HttpVerb,
    /// Path with placeholders substituted and percent-encoded
    pub path: String,
    /// Query pairs keyed by wire name
    pub query: Vec<(String, Value)>,
    /// Body
    pub payload: RequestPayload,
    /// Negotiated media type
    pub content_type: Option<String>,
}

/// Raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Body text
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends assembled requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Transport`] if no response was received.
    /// Error statuses are not errors at this level.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;
}

/// [`Transport`] that refuses every request.
///
/// Lets a registry be built when only the descriptors are needed, e.g. to
/// list the tools of an API without a way to reach it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedTransport;

#[async_trait]
impl Transport for DetachedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        Err(RequestError::Transport(format!(
            "no transport configured for {} {}",
            request.method, request.path
        )))
    }
}

/// Runs a request plan.
///
/// # Errors
///
/// - [`RequestError::MissingParameter`] before anything is sent
/// - [`RequestError::Transport`] or [`RequestError::Status`] for failed
///   requests
/// - [`RequestError::Decode`] for non-JSON success bodies
pub async fn invoke(
    plan: &RequestPlan,
    args: &Map<String, Value>,
    transport: &dyn Transport,
) -> Result<Value, RequestError> {
    let request = build_request(plan, args)?;
    tracing::debug!(method = %plan.verb, path = %request.path, "Dispatching request");
    let response = transport.send(request).await?;
    decode_response(response)
}

/// Assembles the request a plan describes.
///
/// `null` values count as absent: they never reach the query, form, file
/// or JSON object payloads.
///
/// # Errors
///
/// Returns [`RequestError::MissingParameter`] if a required argument or a
/// path placeholder value is absent.
pub fn build_request(plan: &RequestPlan, args: &Map<String, Value>) -> Result<HttpRequest, RequestError> {
    for name in &plan.required {
        if present(args, name).is_none() {
            return Err(RequestError::MissingParameter(name.clone()));
        }
    }

    let mut path = plan.path.clone();
    for binding in &plan.path_params {
        let value = present(args, &binding.internal)
            .ok_or_else(|| RequestError::MissingParameter(binding.internal.clone()))?;
        path = path.replace(
            &format!("{{{}}}", binding.external),
            &percent_encode_path_param(&text_value(value)),
        );
    }

    let query = plan
        .query_params
        .iter()
        .filter_map(|binding| {
            present(args, &binding.internal).map(|value| (binding.external.clone(), value.clone()))
        })
        .collect();

    let single = |param: &str| present(args, param).cloned();
    let payload = match &plan.body {
        BodyShape::None => RequestPayload::None,
        BodyShape::Multipart { fields, files } => RequestPayload::Multipart {
            fields: collect_fields(args, fields),
            files: collect_fields(args, files),
        },
        BodyShape::Form { fields } => RequestPayload::Form(collect_fields(args, fields)),
        BodyShape::JsonObject { fields, .. } => {
            RequestPayload::Json(Value::Object(collect_fields(args, fields)))
        }
        BodyShape::JsonArray { param, .. } | BodyShape::JsonAny { param, .. } => {
            single(param).map_or(RequestPayload::None, RequestPayload::Json)
        }
        BodyShape::Raw { param, .. } => single(param).map_or(RequestPayload::None, RequestPayload::Raw),
    };

    Ok(HttpRequest {
        method: plan.verb,
        path,
        query,
        payload,
        content_type: plan.body.content_type().map(str::to_string),
    })
}

/// Turns a response into a decoded value.
///
/// # Errors
///
/// Returns [`RequestError::Status`] for non-2xx statuses and
/// [`RequestError::Decode`] if a success body is not JSON.
pub fn decode_response(response: HttpResponse) -> Result<Value, RequestError> {
    if !(200..300).contains(&response.status) {
        return Err(RequestError::Status {
            status: response.status,
            body: response.body,
        });
    }
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|source| RequestError::Decode { source })
}

/// Wraps a generated method as a callable tool.
///
/// Parameters keep their IR schemas. Optional ones take the schema's
/// `default`, or `null`, which [`build_request`] treats as absent.
#[must_use]
pub fn operation_tool(method: &GeneratedMethod, transport: Arc<dyn Transport>) -> ToolFunction {
    let plan = Arc::new(method.plan.clone());
    let handler = move |args: Map<String, Value>| -> ToolFuture {
        let plan = Arc::clone(&plan);
        let transport = Arc::clone(&transport);
        Box::pin(async move { Ok(invoke(&plan, &args, transport.as_ref()).await?) })
    };

    method.params.iter().fold(
        ToolFunction::new(method.name.clone(), handler).doc(render_doc(&method.doc)),
        |function, spec| {
            let mut param = ParamDecl::new(spec.internal_name.clone());
            if spec.schema.as_object().is_some_and(|object| !object.is_empty()) {
                param = param.with_schema(spec.schema.clone());
            }
            if !spec.required {
                let default = spec.schema.get("default").cloned().unwrap_or(Value::Null);
                param = param.with_default(default);
            }
            function.param(param)
        },
    )
}

/// Wraps every method of a client.
#[must_use]
pub fn operation_tools(client: &GeneratedClient, transport: &Arc<dyn Transport>) -> Vec<ToolFunction> {
    client
        .methods
        .iter()
        .map(|method| operation_tool(method, Arc::clone(transport)))
        .collect()
}

impl ToolRegistry {
    /// Builds a registry exposing every method of a generated client.
    ///
    /// Methods that cannot be modelled are skipped with a warning.
    #[must_use]
    pub fn from_client(client: &GeneratedClient, transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::new();
        for function in operation_tools(client, &transport) {
            let name = function.name().to_string();
            if let Err(e) = registry.register(function) {
                tracing::warn!(tool = %name, "Skipping operation: {e}");
            }
        }
        registry
    }
}

fn present<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|value| !value.is_null())
}

fn collect_fields(args: &Map<String, Value>, bindings: &[Binding]) -> Map<String, Value> {
    bindings
        .iter()
        .filter_map(|binding| {
            present(args, &binding.internal).map(|value| (binding.external.clone(), value.clone()))
        })
        .collect()
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn percent_encode_path_param(s: &str) -> String {
    let mut encoded = String::new();
    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => encoded.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    let _ = write!(&mut encoded, "%{byte:02X}");
                }
            }
        }
    }
    encoded
}
