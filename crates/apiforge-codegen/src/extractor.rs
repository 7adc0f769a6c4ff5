//! Operation extraction.
//!
//! Walks a resolved document and turns each (path, verb) pair into an
//! [`ExtractedOperation`] with classified path, query and body parameters.

use crate::naming::{sanitize_identifier, to_snake_case};
use crate::typescript::is_binary_schema;
use apiforge_core::{Error, HttpVerb, ReturnKind, Result};
use apiforge_schema::{SchemaDocument, UNRESOLVED_MARKER, find_unresolved};
use serde_json::{Map, Value};

/// One (path, verb) pair of the document.
#[derive(Debug, Clone)]
pub struct Operation<'a> {
    /// Path template
    pub path: &'a str,
    /// HTTP verb
    pub verb: HttpVerb,
    /// The operation object
    pub raw: &'a Map<String, Value>,
    path_parameters: &'a [Value],
}

impl Operation<'_> {
    /// Returns a `VERB /path` label for logs and errors.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.verb.as_upper(), self.path)
    }

    /// Returns the `operationId`, if any.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.raw.get("operationId").and_then(Value::as_str)
    }

    /// Returns path-level and operation-level parameters merged; the
    /// operation wins on `(name, in)`.
    #[must_use]
    pub fn parameters(&self) -> Vec<&Value> {
        let key = |param: &Value| {
            (
                param.get("name").and_then(Value::as_str).map(str::to_string),
                param.get("in").and_then(Value::as_str).map(str::to_string),
            )
        };

        let mut merged: Vec<&Value> = self.path_parameters.iter().collect();
        let own = self
            .raw
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for param in own {
            match merged.iter().position(|existing| key(existing) == key(param)) {
                Some(index) => merged[index] = param,
                None => merged.push(param),
            }
        }
        merged
    }
}

/// Lists every operation in document order: paths first, then the verb keys
/// of each path item as written.
#[must_use]
pub fn operations(document: &SchemaDocument) -> Vec<Operation<'_>> {
    let mut found = Vec::new();
    for (path, item) in document.paths() {
        let path_parameters = item
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for (key, value) in item {
            let Ok(verb) = key.parse::<HttpVerb>() else {
                continue;
            };
            if let Some(raw) = value.as_object() {
                found.push(Operation {
                    path,
                    verb,
                    raw,
                    path_parameters,
                });
            }
        }
    }
    found
}

/// A parameter as declared, before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParameter {
    /// Wire-level name
    pub name: String,
    /// Value schema
    pub schema: Value,
    /// Description, empty when absent
    pub description: String,
    /// Whether the caller must supply it
    pub required: bool,
    /// Example value
    pub example: Option<Value>,
    /// Whether the value is a file upload
    pub is_file: bool,
}

/// Request body after content negotiation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Multipart form split into plain and file fields
    Multipart {
        /// Plain fields
        fields: Vec<RawParameter>,
        /// File fields
        files: Vec<RawParameter>,
    },
    /// URL-encoded form fields
    Form {
        /// Form fields
        fields: Vec<RawParameter>,
    },
    /// JSON object with one parameter per property
    JsonObject {
        /// Media type
        content_type: String,
        /// Properties
        fields: Vec<RawParameter>,
    },
    /// JSON array as one collection parameter
    JsonArray {
        /// Media type
        content_type: String,
        /// The collection parameter
        param: RawParameter,
    },
    /// Property-less JSON object as one optional parameter
    JsonAny {
        /// Media type
        content_type: String,
        /// The object parameter
        param: RawParameter,
    },
    /// Opaque content
    Raw {
        /// Media type
        content_type: String,
        /// The content parameter
        param: RawParameter,
    },
}

/// An operation with classified parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedOperation {
    /// Path template
    pub path: String,
    /// HTTP verb
    pub verb: HttpVerb,
    /// `operationId`
    pub operation_id: Option<String>,
    /// One-line summary
    pub summary: String,
    /// Longer description
    pub description: String,
    /// Classification tags
    pub tags: Vec<String>,
    /// Path parameters in declaration order
    pub path_params: Vec<RawParameter>,
    /// Query parameters in declaration order
    pub query_params: Vec<RawParameter>,
    /// Request body
    pub body: RequestBody,
    /// Shape of the success response
    pub return_kind: ReturnKind,
    /// Description of the success response
    pub returns_description: String,
}

/// Classifies one operation.
///
/// # Errors
///
/// Returns [`Error::UnresolvedReference`] if the operation contains a node
/// the loader could not dereference, and [`Error::InvalidSchema`] if a
/// parameter has no name.
pub fn extract(operation: &Operation<'_>) -> Result<ExtractedOperation> {
    let parameters = operation.parameters();

    let unresolved = operation
        .raw
        .get(UNRESOLVED_MARKER)
        .and_then(Value::as_str)
        .or_else(|| operation.raw.values().find_map(find_unresolved))
        .or_else(|| parameters.iter().copied().find_map(find_unresolved));
    if let Some(reference) = unresolved {
        return Err(Error::UnresolvedReference {
            operation: operation.label(),
            reference: reference.to_string(),
        });
    }

    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    for param in parameters {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            return Err(Error::InvalidSchema {
                location: operation.label(),
                reason: "parameter without a name".to_string(),
            });
        };

        match param.get("in").and_then(Value::as_str) {
            Some("path") => {
                let mut raw = raw_parameter(name, param);
                raw.required = true;
                path_params.push(raw);
            }
            Some("query") => query_params.push(raw_parameter(name, param)),
            location => {
                tracing::debug!(
                    "Ignoring {} parameter '{name}' of {}",
                    location.unwrap_or("unplaced"),
                    operation.label()
                );
            }
        }
    }

    let (return_kind, returns_description) = return_info(operation.raw);

    Ok(ExtractedOperation {
        path: operation.path.to_string(),
        verb: operation.verb,
        operation_id: operation.operation_id().map(str::to_string),
        summary: text_field(operation.raw, "summary"),
        description: text_field(operation.raw, "description"),
        tags: operation
            .raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
        path_params,
        query_params,
        body: classify_body(operation.raw),
        return_kind,
        returns_description,
    })
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn raw_parameter(name: &str, param: &Value) -> RawParameter {
    let schema = param
        .get("schema")
        .or_else(|| {
            param
                .get("content")
                .and_then(Value::as_object)
                .and_then(|content| content.values().next())
                .and_then(|media| media.get("schema"))
        })
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    let example = param
        .get("example")
        .or_else(|| {
            param
                .get("examples")
                .and_then(Value::as_object)
                .and_then(|examples| examples.values().next())
                .and_then(|example| example.get("value"))
        })
        .or_else(|| schema.get("example"))
        .cloned();

    RawParameter {
        name: name.to_string(),
        description: param
            .get("description")
            .or_else(|| schema.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        required: param.get("required").and_then(Value::as_bool).unwrap_or(false),
        example,
        is_file: is_file_schema(&schema),
        schema,
    }
}

fn is_file_schema(schema: &Value) -> bool {
    is_binary_schema(schema)
        || (schema.get("type").and_then(Value::as_str) == Some("array")
            && schema.get("items").is_some_and(is_binary_schema))
}

fn media_type_base(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json_media_type(media_type: &str) -> bool {
    let base = media_type_base(media_type);
    base == "application/json" || base.ends_with("+json")
}

fn is_textual_media_type(media_type: &str) -> bool {
    let base = media_type_base(media_type);
    base.starts_with("text/") || is_json_media_type(&base) || base.ends_with("xml")
}

fn classify_body(raw: &Map<String, Value>) -> RequestBody {
    let Some(request_body) = raw.get("requestBody") else {
        return RequestBody::None;
    };
    let body_required = request_body
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let Some(content) = request_body.get("content").and_then(Value::as_object) else {
        return RequestBody::None;
    };
    let description = request_body
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let find = |wanted: &str| {
        content
            .iter()
            .find(|(media_type, _)| media_type_base(media_type) == wanted)
    };
    let schema_of = |media: &Value| {
        media
            .get("schema")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    };

    if let Some((_, media)) = find("multipart/form-data") {
        let (files, fields): (Vec<RawParameter>, Vec<RawParameter>) = object_fields(&schema_of(media), body_required)
            .into_iter()
            .partition(|field| field.is_file);
        return RequestBody::Multipart { fields, files };
    }

    if let Some((_, media)) = find("application/x-www-form-urlencoded") {
        return RequestBody::Form {
            fields: object_fields(&schema_of(media), body_required),
        };
    }

    if let Some((media_type, media)) = content
        .iter()
        .find(|(media_type, _)| is_json_media_type(media_type))
    {
        let schema = schema_of(media);
        let content_type = media_type_base(media_type);
        let schema_type = schema.get("type").and_then(Value::as_str);
        let has_properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|properties| !properties.is_empty());

        if has_properties && matches!(schema_type, None | Some("object")) {
            return RequestBody::JsonObject {
                content_type,
                fields: object_fields(&schema, body_required),
            };
        }
        if schema_type == Some("array") {
            let name = array_param_name(&schema);
            return RequestBody::JsonArray {
                content_type,
                param: body_param(&name, schema, description, body_required),
            };
        }
        if matches!(schema_type, None | Some("object")) {
            return RequestBody::JsonAny {
                content_type,
                param: body_param("body", schema, description, false),
            };
        }
        return RequestBody::Raw {
            content_type,
            param: body_param("content", schema, description, body_required),
        };
    }

    let Some((media_type, media)) = content.iter().next() else {
        return RequestBody::None;
    };
    let schema = schema_of(media);
    let mut param = body_param("content", schema, description, body_required);
    param.is_file = is_binary_schema(&param.schema) || !is_textual_media_type(media_type);
    RequestBody::Raw {
        content_type: media_type_base(media_type),
        param,
    }
}

fn body_param(name: &str, schema: Value, description: &str, required: bool) -> RawParameter {
    RawParameter {
        name: name.to_string(),
        description: schema
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or(description)
            .to_string(),
        required,
        example: schema.get("example").cloned(),
        is_file: is_file_schema(&schema),
        schema,
    }
}

fn object_fields(schema: &Value, body_required: bool) -> Vec<RawParameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter(|(_, property)| property.get("readOnly").and_then(Value::as_bool) != Some(true))
        .map(|(name, property)| RawParameter {
            name: name.clone(),
            schema: property.clone(),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            required: body_required && required.contains(&name.as_str()),
            example: property.get("example").cloned(),
            is_file: is_file_schema(property),
        })
        .collect()
}

fn array_param_name(schema: &Value) -> String {
    let from_title = |node: Option<&Value>| {
        node.and_then(|node| node.get("title"))
            .and_then(Value::as_str)
            .map(to_snake_case)
            .filter(|name| !name.is_empty())
    };

    if let Some(name) = from_title(Some(schema)) {
        return sanitize_identifier(&name);
    }
    if let Some(name) = from_title(schema.get("items")) {
        return sanitize_identifier(&format!("{name}_list"));
    }
    "items".to_string()
}

fn return_info(raw: &Map<String, Value>) -> (ReturnKind, String) {
    let Some(responses) = raw.get("responses").and_then(Value::as_object) else {
        return (ReturnKind::Unknown, String::new());
    };

    let response = responses
        .iter()
        .find(|(status, _)| status.starts_with('2'))
        .or_else(|| responses.iter().find(|(status, _)| status.as_str() == "default"))
        .map(|(_, response)| response);
    let Some(response) = response else {
        return (ReturnKind::Unknown, String::new());
    };

    let description = response
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let schema = response
        .get("content")
        .and_then(Value::as_object)
        .and_then(|content| {
            content
                .iter()
                .find(|(media_type, _)| is_json_media_type(media_type))
        })
        .and_then(|(_, media)| media.get("schema"));

    let kind = match schema {
        Some(schema) => match schema.get("type").and_then(Value::as_str) {
            Some("array") => ReturnKind::List,
            Some("object") => ReturnKind::Map,
            None if schema.get("properties").is_some()
                || schema.get("additionalProperties").is_some() =>
            {
                ReturnKind::Map
            }
            _ => ReturnKind::Unknown,
        },
        None => ReturnKind::Unknown,
    };

    (kind, description)
}
