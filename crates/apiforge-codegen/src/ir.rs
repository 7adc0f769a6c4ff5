//! Intermediate representation of a generated client.
//!
//! The IR is what the renderer turns into source and what the segment
//! partitioner regroups. It serializes to JSON so a client can be split
//! again later without the original document.

use apiforge_core::{HttpVerb, ParamLocation, ReturnKind};
use apiforge_docs::ParsedDoc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A whole client: class metadata plus its methods in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedClient {
    /// Name of the emitted class
    pub class_name: String,
    /// `info.title` of the source document
    pub title: String,
    /// Default base URL baked into the constructor
    pub base_url: String,
    /// Methods in document order
    pub methods: Vec<GeneratedMethod>,
}

impl GeneratedClient {
    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&GeneratedMethod> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// Returns method names in order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|method| method.name.as_str())
    }
}

/// One client method derived from one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMethod {
    /// Unique method name within the client
    pub name: String,
    /// Parameters in signature order: required first, then optional
    pub params: Vec<ParameterSpec>,
    /// Structured documentation block
    pub doc: ParsedDoc,
    /// Operation the method came from; drives segment grouping
    pub path_marker: Option<PathMarker>,
    /// Structured request assembly
    pub plan: RequestPlan,
    /// Shape of the decoded response
    pub return_kind: ReturnKind,
    /// Rendered TypeScript parameter list
    pub signature: String,
    /// Rendered TypeScript return type
    pub return_type: String,
    /// Rendered TypeScript body statements, one per line, unindented
    pub body: Vec<String>,
}

impl GeneratedMethod {
    /// Looks up a parameter by internal name.
    #[must_use]
    pub fn param(&self, internal_name: &str) -> Option<&ParameterSpec> {
        self.params
            .iter()
            .find(|param| param.internal_name == internal_name)
    }
}

/// `@path VERB /path` marker recording where a method came from.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::PathMarker;
/// use apiforge_core::HttpVerb;
///
/// let marker: PathMarker = "@path GET /pet/{petId}".parse().unwrap();
/// assert_eq!(marker.verb, HttpVerb::Get);
/// assert_eq!(marker.to_string(), "@path GET /pet/{petId}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMarker {
    /// HTTP verb
    pub verb: HttpVerb,
    /// Path template as written in the document
    pub path: String,
}

impl PathMarker {
    /// Marker prefix.
    pub const PREFIX: &'static str = "@path";
}

impl fmt::Display for PathMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", Self::PREFIX, self.verb.as_upper(), self.path)
    }
}

impl std::str::FromStr for PathMarker {
    type Err = apiforge_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || apiforge_core::Error::InvalidArgument(format!("not a path marker: '{s}'"));
        let mut parts = s.split_whitespace();
        if parts.next() != Some(Self::PREFIX) {
            return Err(invalid());
        }
        let verb = parts.next().ok_or_else(invalid)?.parse()?;
        let path = parts.next().ok_or_else(invalid)?.to_string();
        Ok(Self { verb, path })
    }
}

/// One method parameter after name resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Wire-level key
    pub external_name: String,
    /// Collision-free identifier used in the signature
    pub internal_name: String,
    /// Where the value travels
    pub location: ParamLocation,
    /// TypeScript type
    pub ts_type: String,
    /// Resolved JSON Schema of the value
    pub schema: Value,
    /// Documentation type hint, e.g. `list of strings`
    pub type_hint: String,
    /// Description from the document, empty when absent
    pub description: String,
    /// Whether the caller must supply a value
    pub required: bool,
    /// Example value from the document
    pub example: Option<Value>,
    /// Whether the value is uploaded as a file
    pub is_file: bool,
}

/// Pairs a signature identifier with its wire key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Identifier in the method signature
    pub internal: String,
    /// Key sent over the wire
    pub external: String,
}

impl Binding {
    /// Creates a binding.
    pub fn new(internal: impl Into<String>, external: impl Into<String>) -> Self {
        Self {
            internal: internal.into(),
            external: external.into(),
        }
    }
}

/// Structured form of a method's body statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPlan {
    /// HTTP verb
    pub verb: HttpVerb,
    /// Path template with `{external}` placeholders
    pub path: String,
    /// Internal names checked for presence before dispatch
    pub required: Vec<String>,
    /// Placeholder substitutions
    pub path_params: Vec<Binding>,
    /// Query string entries
    pub query_params: Vec<Binding>,
    /// Request body assembly
    pub body: BodyShape,
}

/// How the request body is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyShape {
    /// No request body
    #[default]
    None,
    /// `multipart/form-data` with separate plain and file fields
    Multipart {
        /// Plain form fields
        fields: Vec<Binding>,
        /// File fields
        files: Vec<Binding>,
    },
    /// `application/x-www-form-urlencoded` fields
    Form {
        /// Form fields
        fields: Vec<Binding>,
    },
    /// JSON object assembled from one parameter per property
    JsonObject {
        /// Negotiated media type
        content_type: String,
        /// Object properties
        fields: Vec<Binding>,
    },
    /// JSON array passed through from one collection parameter
    JsonArray {
        /// Negotiated media type
        content_type: String,
        /// Parameter holding the array
        param: String,
    },
    /// Free-form JSON object from one optional parameter
    JsonAny {
        /// Negotiated media type
        content_type: String,
        /// Parameter holding the object
        param: String,
    },
    /// Opaque content sent as-is
    Raw {
        /// Negotiated media type
        content_type: String,
        /// Parameter holding the content
        param: String,
    },
}

impl BodyShape {
    /// Returns the media type sent with the request, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Multipart { .. } => Some("multipart/form-data"),
            Self::Form { .. } => Some("application/x-www-form-urlencoded"),
            Self::JsonObject { content_type, .. }
            | Self::JsonArray { content_type, .. }
            | Self::JsonAny { content_type, .. }
            | Self::Raw { content_type, .. } => Some(content_type),
        }
    }

    /// Returns the internal names of every parameter the body consumes.
    #[must_use]
    pub fn params(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::Multipart { fields, files } => fields
                .iter()
                .chain(files)
                .map(|binding| binding.internal.as_str())
                .collect(),
            Self::Form { fields } | Self::JsonObject { fields, .. } => {
                fields.iter().map(|binding| binding.internal.as_str()).collect()
            }
            Self::JsonArray { param, .. } | Self::JsonAny { param, .. } | Self::Raw { param, .. } => {
                vec![param.as_str()]
            }
        }
    }
}
