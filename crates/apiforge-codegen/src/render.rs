//! Method rendering.
//!
//! Turns an [`ExtractedOperation`] into a [`GeneratedMethod`]: resolved
//! parameter names, documentation block, request plan and the TypeScript
//! statements that execute it.

use crate::extractor::{ExtractedOperation, RawParameter, RequestBody};
use crate::ir::{BodyShape, Binding, GeneratedMethod, ParameterSpec, PathMarker, RequestPlan};
use crate::naming::{NameAllocator, method_name, sanitize_identifier};
use crate::typescript::{json_schema_to_typescript, string_literal};
use apiforge_core::{ParamLocation, Result, ReturnKind};
use apiforge_docs::{ArgDoc, ParsedDoc, RaiseDoc};
use serde_json::Value;

/// Failure kinds every generated method documents.
pub const RAISES: [(&str, &str); 2] = [
    (
        "HttpError",
        "If the request fails or the server answers with an error status.",
    ),
    ("DecodeError", "If the response body is not valid JSON."),
];

/// Builds the method for one operation.
///
/// The method name is the operation's preferred name; the caller makes it
/// unique across the client.
///
/// # Errors
///
/// Returns [`apiforge_core::Error::NameCollision`] if a parameter name
/// cannot be made unique.
pub fn build_method(operation: &ExtractedOperation) -> Result<GeneratedMethod> {
    let mut names = NameAllocator::for_parameters();
    let mut params: Vec<ParameterSpec> = Vec::new();

    let mut path_params = Vec::new();
    for raw in &operation.path_params {
        let spec = resolve(&mut names, raw, ParamLocation::Path)?;
        path_params.push(Binding::new(&spec.internal_name, &spec.external_name));
        params.push(spec);
    }

    let mut query_params = Vec::new();
    for raw in &operation.query_params {
        let spec = resolve(&mut names, raw, ParamLocation::Query)?;
        query_params.push(Binding::new(&spec.internal_name, &spec.external_name));
        params.push(spec);
    }

    let body = resolve_body(&mut names, &operation.body, &mut params)?;

    // Stable sort keeps path > query > body order inside each group.
    params.sort_by_key(|param| !param.required);

    let plan = RequestPlan {
        verb: operation.verb,
        path: operation.path.clone(),
        required: params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.internal_name.clone())
            .collect(),
        path_params,
        query_params,
        body,
    };

    Ok(GeneratedMethod {
        name: method_name(
            operation.operation_id.as_deref(),
            operation.verb,
            &operation.path,
        ),
        doc: build_doc(operation, &params),
        path_marker: Some(PathMarker {
            verb: operation.verb,
            path: operation.path.clone(),
        }),
        signature: render_signature(&params),
        return_type: return_type(operation.return_kind).to_string(),
        body: render_body(&plan, operation.return_kind),
        return_kind: operation.return_kind,
        plan,
        params,
    })
}

fn resolve(
    names: &mut NameAllocator,
    raw: &RawParameter,
    location: ParamLocation,
) -> Result<ParameterSpec> {
    let internal_name = names.claim(&sanitize_identifier(&raw.name), location)?;
    Ok(ParameterSpec {
        external_name: raw.name.clone(),
        internal_name,
        location,
        ts_type: if raw.is_file && !raw.schema.get("type").is_some_and(|t| t == "array") {
            "Blob".to_string()
        } else {
            json_schema_to_typescript(&raw.schema)
        },
        type_hint: type_hint(&raw.schema, raw.is_file),
        schema: raw.schema.clone(),
        description: raw.description.clone(),
        required: raw.required,
        example: raw.example.clone(),
        is_file: raw.is_file,
    })
}

fn resolve_fields(
    names: &mut NameAllocator,
    fields: &[RawParameter],
    params: &mut Vec<ParameterSpec>,
) -> Result<Vec<Binding>> {
    let mut bindings = Vec::with_capacity(fields.len());
    for raw in fields {
        let spec = resolve(names, raw, ParamLocation::Body)?;
        bindings.push(Binding::new(&spec.internal_name, &spec.external_name));
        params.push(spec);
    }
    Ok(bindings)
}

fn resolve_single(
    names: &mut NameAllocator,
    raw: &RawParameter,
    params: &mut Vec<ParameterSpec>,
) -> Result<String> {
    let spec = resolve(names, raw, ParamLocation::Body)?;
    let internal = spec.internal_name.clone();
    params.push(spec);
    Ok(internal)
}

fn resolve_body(
    names: &mut NameAllocator,
    body: &RequestBody,
    params: &mut Vec<ParameterSpec>,
) -> Result<BodyShape> {
    Ok(match body {
        RequestBody::None => BodyShape::None,
        RequestBody::Multipart { fields, files } => BodyShape::Multipart {
            fields: resolve_fields(names, fields, params)?,
            files: resolve_fields(names, files, params)?,
        },
        RequestBody::Form { fields } => BodyShape::Form {
            fields: resolve_fields(names, fields, params)?,
        },
        RequestBody::JsonObject {
            content_type,
            fields,
        } => BodyShape::JsonObject {
            content_type: content_type.clone(),
            fields: resolve_fields(names, fields, params)?,
        },
        RequestBody::JsonArray {
            content_type,
            param,
        } => BodyShape::JsonArray {
            content_type: content_type.clone(),
            param: resolve_single(names, param, params)?,
        },
        RequestBody::JsonAny {
            content_type,
            param,
        } => BodyShape::JsonAny {
            content_type: content_type.clone(),
            param: resolve_single(names, param, params)?,
        },
        RequestBody::Raw {
            content_type,
            param,
        } => BodyShape::Raw {
            content_type: content_type.clone(),
            param: resolve_single(names, param, params)?,
        },
    })
}

/// Describes a schema in documentation vocabulary: `string`, `integer`,
/// `list of strings`, `object`, `file`, ...
///
/// # Examples
///
/// ```
/// use apiforge_codegen::render::type_hint;
/// use serde_json::json;
///
/// assert_eq!(type_hint(&json!({"type": "array", "items": {"type": "string"}}), false), "list of strings");
/// assert_eq!(type_hint(&json!({"type": "string", "format": "binary"}), true), "file");
/// assert_eq!(type_hint(&json!({}), false), "any");
/// ```
#[must_use]
pub fn type_hint(schema: &Value, is_file: bool) -> String {
    let schema_type = schema.get("type").and_then(Value::as_str);
    if is_file {
        return if schema_type == Some("array") {
            "list of files".to_string()
        } else {
            "file".to_string()
        };
    }

    match schema_type {
        Some(primitive @ ("string" | "integer" | "number" | "boolean" | "object")) => {
            primitive.to_string()
        }
        Some("array") => match schema.get("items").map(|items| type_hint(items, false)) {
            Some(item) if item != "any" => format!("list of {}", plural(&item)),
            _ => "list".to_string(),
        },
        None if schema.get("properties").is_some() => "object".to_string(),
        _ => "any".to_string(),
    }
}

fn plural(hint: &str) -> String {
    if hint.starts_with("list") {
        "lists".to_string()
    } else {
        format!("{hint}s")
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn build_doc(operation: &ExtractedOperation, params: &[ParameterSpec]) -> ParsedDoc {
    let mut paragraphs: Vec<String> = Vec::new();
    for text in [&operation.summary, &operation.description] {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let paragraph = lines
            .split(|line| line.is_empty())
            .filter(|block| !block.is_empty())
            .map(|block| block.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        if !paragraph.is_empty() && !paragraphs.contains(&paragraph) {
            paragraphs.push(paragraph);
        }
    }
    if paragraphs.is_empty() {
        paragraphs.push(format!("{} {}", operation.verb.as_upper(), operation.path));
    }

    let args = params
        .iter()
        .map(|param| {
            let mut description = normalize(&param.description);
            if description.is_empty() {
                description.clone_from(&param.external_name);
            }
            if let Some(example) = &param.example {
                if !description.ends_with('.') {
                    description.push('.');
                }
                description.push_str(&format!(" Example: {example}"));
            }
            ArgDoc::new(&param.internal_name, description).with_type_hint(&param.type_hint)
        })
        .collect();

    let kind = match operation.return_kind {
        ReturnKind::List => "list",
        ReturnKind::Map => "object",
        ReturnKind::Unknown => "any",
    };
    let returns_text = match normalize(&operation.returns_description) {
        text if text.is_empty() => "Decoded response body, or null when empty.".to_string(),
        text => text,
    };

    ParsedDoc {
        summary: paragraphs.join("\n\n"),
        args,
        returns: format!("{kind}: {returns_text}"),
        raises: RAISES
            .iter()
            .map(|(kind, description)| RaiseDoc::new(*kind, *description))
            .collect(),
        tags: operation
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
    }
}

fn render_signature(params: &[ParameterSpec]) -> String {
    params
        .iter()
        .map(|param| {
            if param.required {
                format!("{}: {}", param.internal_name, param.ts_type)
            } else if param.ts_type == "unknown" || param.ts_type.ends_with("| null") {
                format!("{}?: {}", param.internal_name, param.ts_type)
            } else {
                format!("{}?: {} | null", param.internal_name, param.ts_type)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// TypeScript return type for a response shape.
#[must_use]
pub const fn return_type(kind: ReturnKind) -> &'static str {
    match kind {
        ReturnKind::List => "unknown[] | null",
        ReturnKind::Map => "Record<string, unknown> | null",
        ReturnKind::Unknown => "unknown",
    }
}

fn path_expression(plan: &RequestPlan) -> String {
    let mut template = plan.path.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${");
    for binding in &plan.path_params {
        template = template.replace(
            &format!("{{{}}}", binding.external),
            &format!("${{encodeURIComponent(String({}))}}", binding.internal),
        );
    }
    format!("`{template}`")
}

fn assign_fields(lines: &mut Vec<String>, target: &str, value_type: &str, fields: &[Binding]) {
    lines.push(format!("const {target}: Record<string, {value_type}> = {{}};"));
    for field in fields {
        lines.push(format!(
            "if ({} != null) {target}[{}] = {};",
            field.internal,
            string_literal(&field.external),
            field.internal
        ));
    }
}

/// Renders the statements executing `plan`, unindented, one per line.
fn render_body(plan: &RequestPlan, return_kind: ReturnKind) -> Vec<String> {
    let mut lines = Vec::new();

    for name in &plan.required {
        lines.push(format!(
            "if ({name} == null) throw new MissingParameterError({});",
            string_literal(name)
        ));
    }

    lines.push(format!("const _path = {};", path_expression(plan)));

    let mut options: Vec<String> = Vec::new();
    if !plan.query_params.is_empty() {
        assign_fields(&mut lines, "_query", "unknown", &plan.query_params);
        options.push("query: _query".to_string());
    }

    match &plan.body {
        BodyShape::None => {}
        BodyShape::Multipart { fields, files } => {
            assign_fields(&mut lines, "_form", "unknown", fields);
            assign_fields(&mut lines, "_files", "Blob | Blob[]", files);
            options.push("form: _form".to_string());
            options.push("files: _files".to_string());
        }
        BodyShape::Form { fields } => {
            assign_fields(&mut lines, "_form", "unknown", fields);
            options.push("form: _form".to_string());
        }
        BodyShape::JsonObject { fields, .. } => {
            assign_fields(&mut lines, "_payload", "unknown", fields);
            options.push("json: _payload".to_string());
        }
        BodyShape::JsonArray { param, .. } | BodyShape::JsonAny { param, .. } => {
            options.push(format!("json: {param}"));
        }
        BodyShape::Raw { param, .. } => {
            options.push(format!("content: {param}"));
        }
    }

    if let Some(content_type) = plan.body.content_type() {
        options.push(format!("contentType: {}", string_literal(content_type)));
    }

    let options = if options.is_empty() {
        String::new()
    } else {
        format!(", {{ {} }}", options.join(", "))
    };
    lines.push(format!(
        "const _response = await this._{}(_path{options});",
        plan.verb.as_str()
    ));

    match return_kind {
        ReturnKind::Unknown => lines.push("return decodeResponse(_response);".to_string()),
        kind => lines.push(format!(
            "return (await decodeResponse(_response)) as {};",
            return_type(kind)
        )),
    }

    lines
}
