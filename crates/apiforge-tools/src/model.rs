//! Argument models.
//!
//! An [`ArgumentModel`] is built once per callable from its declared
//! parameters and documentation block. It produces the advertised JSON
//! Schema and validates incoming arguments with a compiled `jsonschema`
//! validator.

use crate::dialect;
use crate::error::{Result, ToolError};
use crate::function::{ParamDecl, ToolFunction};
use crate::hints::FieldType;
use apiforge_codegen::naming::RECEIVER_NAMES;
use apiforge_docs::ParsedDoc;
use jsonschema::Validator;
use serde_json::{Map, Value, json};
use std::fmt;

/// Prefix marking parameters that are never exposed.
pub const RESERVED_PREFIX: char = '_';

/// One field of an argument model.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Parameter name
    pub name: String,
    /// Advertised schema, with title, description and default attached
    pub schema: Value,
    /// Field title
    pub title: String,
    /// Description from the declared schema or the documentation block
    pub description: Option<String>,
    /// Default value
    pub default: Option<Value>,
    /// `true` iff there is no default
    pub required: bool,
    /// Type derived from the documentation; `None` for declared types
    pub hinted_type: Option<FieldType>,
    validation: Value,
}

impl FieldSpec {
    /// Returns `true` if the field fell back to the untyped schema.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        self.hinted_type.as_ref().is_some_and(FieldType::is_untyped)
    }

    fn build(param: &ParamDecl, doc: &ParsedDoc, defs: &mut Map<String, Value>) -> Self {
        let doc_entry = doc.arg(&param.name);
        let doc_description = doc_entry
            .map(|arg| arg.description.as_str())
            .filter(|description| !description.is_empty());

        let declared = param
            .schema
            .as_ref()
            .filter(|schema| schema.as_object().is_some_and(|object| !object.is_empty()));

        let (mut schema, mut validation, hinted_type) = match declared {
            Some(declared) => {
                let mut schema = dialect::normalize(declared.clone());
                if let Some(Value::Object(nested)) =
                    schema.as_object_mut().and_then(|object| object.remove("$defs"))
                {
                    defs.extend(nested);
                }
                (schema.clone(), schema, None)
            }
            None => {
                let field_type = doc_entry
                    .and_then(|arg| arg.type_hint.as_deref())
                    .map_or(FieldType::Untyped, FieldType::from_hint);
                (field_type.schema(), field_type.validation_schema(), Some(field_type))
            }
        };

        let object = schema.as_object_mut();
        let mut description = None;
        let mut title = param.name.clone();
        if let Some(object) = object {
            match object.get("description").and_then(Value::as_str) {
                Some(existing) => description = Some(existing.to_string()),
                None => {
                    if let Some(text) = doc_description {
                        object.insert("description".to_string(), json!(text));
                        description = Some(text.to_string());
                    }
                }
            }

            if let Some(explicit) = &param.title {
                title.clone_from(explicit);
            } else if let Some(existing) = object.get("title").and_then(Value::as_str) {
                title = existing.to_string();
            }
            object.insert("title".to_string(), json!(title));

            if let Some(default) = &param.default {
                object.insert("default".to_string(), default.clone());
            }
        }

        if param.default == Some(Value::Null) {
            validation = json!({"anyOf": [validation, {"type": "null"}]});
        }

        Self {
            name: param.name.clone(),
            schema,
            title,
            description,
            default: param.default.clone(),
            required: param.default.is_none(),
            hinted_type,
            validation,
        }
    }
}

/// Validated argument structure of one callable.
pub struct ArgumentModel {
    tool: String,
    fields: Vec<FieldSpec>,
    defs: Map<String, Value>,
    validator: Validator,
}

impl fmt::Debug for ArgumentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentModel")
            .field("tool", &self.tool)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl ArgumentModel {
    /// Builds the model for a callable.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] if more values are bound than
    /// parameters exist, if an exposed parameter name is reserved or
    /// duplicated, or if the resulting schema does not compile.
    pub fn build(function: &ToolFunction, doc: &ParsedDoc) -> Result<Self> {
        let tool = function.name().to_string();
        let configuration = |reason: String| ToolError::Configuration {
            tool: tool.clone(),
            reason,
        };

        let bound = function.boundary().count();
        if bound > function.params().len() {
            return Err(configuration(format!(
                "{bound} values bound but only {} parameters declared",
                function.params().len()
            )));
        }

        let mut fields: Vec<FieldSpec> = Vec::new();
        let mut defs = Map::new();
        for param in function.free_params() {
            if param.name.starts_with(RESERVED_PREFIX) || RECEIVER_NAMES.contains(&param.name.as_str()) {
                return Err(configuration(format!(
                    "parameter '{}' is reserved and cannot be exposed",
                    param.name
                )));
            }
            if fields.iter().any(|field| field.name == param.name) {
                return Err(configuration(format!("duplicate parameter '{}'", param.name)));
            }
            fields.push(FieldSpec::build(param, doc, &mut defs));
        }

        let validation_schema = object_schema(
            fields.iter().map(|field| (field.name.as_str(), &field.validation)),
            &fields,
            &defs,
        );
        let validator = jsonschema::validator_for(&validation_schema)
            .map_err(|e| configuration(format!("argument schema does not compile: {e}")))?;

        tracing::debug!(tool = %tool, fields = fields.len(), "Built argument model");

        Ok(Self {
            tool,
            fields,
            defs,
            validator,
        })
    }

    /// Fields in parameter order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Names of required fields.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.as_str())
            .collect()
    }

    /// The advertised argument schema.
    #[must_use]
    pub fn json_schema(&self) -> Value {
        object_schema(
            self.fields.iter().map(|field| (field.name.as_str(), &field.schema)),
            &self.fields,
            &self.defs,
        )
    }

    /// Validates raw arguments and fills defaults.
    ///
    /// Textual values that decode as JSON arrays or objects are decoded
    /// first. Arguments the model does not know are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] with one message per
    /// violation.
    pub fn validate(&self, raw: Map<String, Value>) -> Result<Map<String, Value>> {
        let mut arguments = Map::new();
        for (name, value) in lenient_decode(raw) {
            if self.field(&name).is_some() {
                arguments.insert(name, value);
            } else {
                tracing::debug!(tool = %self.tool, "Dropping unknown argument '{name}'");
            }
        }

        let mut instance = Value::Object(arguments);
        let errors: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|error| {
                let location = error.instance_path.to_string();
                if location.is_empty() {
                    error.to_string()
                } else {
                    format!("{location}: {error}")
                }
            })
            .collect();
        if !errors.is_empty() {
            return Err(ToolError::InvalidArguments {
                tool: self.tool.clone(),
                errors,
            });
        }

        let mut arguments = instance
            .as_object_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        let mut ordered = Map::new();
        for field in &self.fields {
            match arguments.remove(&field.name) {
                Some(value) => {
                    ordered.insert(field.name.clone(), value);
                }
                None => {
                    if let Some(default) = &field.default {
                        ordered.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(ordered)
    }
}

fn object_schema<'a>(
    properties: impl Iterator<Item = (&'a str, &'a Value)>,
    fields: &[FieldSpec],
    defs: &Map<String, Value>,
) -> Value {
    let properties: Map<String, Value> = properties
        .map(|(name, schema)| (name.to_string(), schema.clone()))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name.as_str())
        .collect();

    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "required": required,
    });
    if !defs.is_empty() {
        schema["$defs"] = Value::Object(defs.clone());
    }
    schema
}

/// Decodes textual values that hold JSON arrays or objects.
///
/// Plain scalars, including strings that happen to parse as JSON numbers
/// or booleans, are left untouched.
///
/// # Examples
///
/// ```
/// use apiforge_tools::model::lenient_decode;
/// use serde_json::{Map, json};
///
/// let raw: Map<_, _> = json!({"ids": "[1, 2]", "count": "3", "name": "rex"})
///     .as_object()
///     .cloned()
///     .unwrap();
/// let decoded = lenient_decode(raw);
/// assert_eq!(decoded["ids"], json!([1, 2]));
/// assert_eq!(decoded["count"], json!("3"));
/// ```
#[must_use]
pub fn lenient_decode(raw: Map<String, Value>) -> Map<String, Value> {
    raw.into_iter()
        .map(|(name, value)| {
            let decoded = match &value {
                Value::String(text) => match serde_json::from_str::<Value>(text) {
                    Ok(nested @ (Value::Array(_) | Value::Object(_))) => Some(nested),
                    _ => None,
                },
                _ => None,
            };
            (name, decoded.unwrap_or(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ToolFuture;
    use apiforge_docs::parse_doc;

    fn noop(_: Map<String, Value>) -> ToolFuture {
        Box::pin(async { Ok(Value::Null) })
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_untyped_parameters_with_default() {
        let doc = parse_doc("Does f.\n\nArgs:\n    a: Untyped a\n    b: Untyped b with default");
        let function = ToolFunction::new("f", noop)
            .param(ParamDecl::new("a"))
            .param(ParamDecl::new("b").with_default(json!(10)));
        let model = ArgumentModel::build(&function, &doc).unwrap();

        assert!(model.fields().iter().all(FieldSpec::is_untyped));
        assert_eq!(model.required(), ["a"]);
        let schema = model.json_schema();
        assert_eq!(schema["properties"]["a"]["type"], "string");
        assert_eq!(schema["properties"]["b"]["default"], 10);
        assert_eq!(schema["properties"]["b"]["description"], "Untyped b with default");
        assert_eq!(schema["required"], json!(["a"]));

        let validated = model.validate(args(json!({"a": 5}))).unwrap();
        assert_eq!(Value::Object(validated), json!({"a": 5, "b": 10}));
    }

    #[test]
    fn test_declared_type_wins_over_hint() {
        let doc = parse_doc("Gets an item.\n\nArgs:\n    item_id (int): The item identifier.");
        let function =
            ToolFunction::new("get_item", noop).param(ParamDecl::new("item_id").typed::<i64>());
        let model = ArgumentModel::build(&function, &doc).unwrap();

        let field = model.field("item_id").unwrap();
        assert_eq!(field.hinted_type, None);
        assert_eq!(field.schema["type"], "integer");
        assert_eq!(field.schema["description"], "The item identifier.");
        assert_eq!(field.title, "item_id");

        let err = model.validate(args(json!({"item_id": "seven"}))).unwrap_err();
        assert!(err.is_invalid_arguments());
    }

    #[test]
    fn test_declared_description_is_kept() {
        let doc = parse_doc("Args:\n    q (string): From docs.");
        let function = ToolFunction::new("search", noop).param(
            ParamDecl::new("q").with_schema(json!({"type": "string", "description": "Declared."})),
        );
        let model = ArgumentModel::build(&function, &doc).unwrap();
        assert_eq!(model.field("q").unwrap().description.as_deref(), Some("Declared."));
    }

    #[test]
    fn test_hint_table_drives_undeclared_types() {
        let doc = parse_doc("Args:\n    tags (list of strings): Tags.\n    limit (integer): Limit.");
        let function = ToolFunction::new("list", noop)
            .param(ParamDecl::new("tags"))
            .param(ParamDecl::new("limit").with_default(json!(20)));
        let model = ArgumentModel::build(&function, &doc).unwrap();

        assert_eq!(
            model.field("tags").unwrap().hinted_type,
            Some(FieldType::Array(Some(Box::new(FieldType::String))))
        );
        let err = model.validate(args(json!({"tags": [1, 2]}))).unwrap_err();
        let ToolError::InvalidArguments { errors, .. } = err else {
            panic!("expected invalid arguments");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("/tags/0"));
    }

    #[test]
    fn test_lenient_decoding_before_validation() {
        let doc = parse_doc("Args:\n    filter (object): Filter.");
        let function = ToolFunction::new("find", noop).param(ParamDecl::new("filter"));
        let model = ArgumentModel::build(&function, &doc).unwrap();

        let validated = model
            .validate(args(json!({"filter": "{\"status\": \"sold\"}", "extra": 1})))
            .unwrap();
        assert_eq!(Value::Object(validated), json!({"filter": {"status": "sold"}}));
    }

    #[test]
    fn test_null_default_accepts_null() {
        let function = ToolFunction::new("upload", noop).param(
            ParamDecl::new("file")
                .with_schema(json!({"type": "string", "format": "binary"}))
                .with_default(Value::Null),
        );
        let model = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap();
        let validated = model.validate(args(json!({"file": null}))).unwrap();
        assert_eq!(validated["file"], Value::Null);
        assert!(model.validate(args(json!({}))).is_ok());
    }

    #[test]
    fn test_openapi_bounds_and_nullable_compile() {
        let function = ToolFunction::new("list", noop)
            .param(
                ParamDecl::new("limit")
                    .with_schema(json!({"type": "integer", "minimum": 0, "exclusiveMinimum": true})),
            )
            .param(
                ParamDecl::new("status")
                    .with_schema(json!({"type": "string", "nullable": true}))
                    .with_default(json!("available")),
            );
        let model = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap();

        assert_eq!(model.field("limit").unwrap().schema["exclusiveMinimum"], 0);
        assert!(model.validate(args(json!({"limit": 1, "status": null}))).is_ok());
        let err = model.validate(args(json!({"limit": 0}))).unwrap_err();
        assert!(err.is_invalid_arguments());
    }

    #[test]
    fn test_missing_required_argument() {
        let function = ToolFunction::new("f", noop).param(ParamDecl::new("a"));
        let model = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap();
        let err = model.validate(Map::new()).unwrap_err();
        assert!(err.to_string().contains("\"a\" is a required property"));
    }

    #[test]
    fn test_reserved_parameters_are_configuration_errors() {
        for name in ["_secret", "self", "this"] {
            let function = ToolFunction::new("f", noop).param(ParamDecl::new(name));
            let err = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap_err();
            assert!(err.is_configuration(), "{name}");
        }
    }

    #[test]
    fn test_bound_parameters_are_excluded() {
        let function = ToolFunction::new("f", noop)
            .param(ParamDecl::new("_client"))
            .param(ParamDecl::new("query"))
            .bind([json!("handle")]);
        let model = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap();
        let names: Vec<&str> = model.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["query"]);
    }

    #[test]
    fn test_over_binding_is_a_configuration_error() {
        let function = ToolFunction::new("f", noop)
            .param(ParamDecl::new("a"))
            .bind([json!(1), json!(2)]);
        let err = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_nested_definitions_are_hoisted() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Inner {
            value: i32,
        }
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Outer {
            inner: Inner,
            more: Vec<Inner>,
        }

        let function = ToolFunction::new("f", noop).param(ParamDecl::new("outer").typed::<Outer>());
        let model = ArgumentModel::build(&function, &ParsedDoc::default()).unwrap();
        let schema = model.json_schema();
        assert!(schema["$defs"]["Inner"].is_object());
        assert!(schema["properties"]["outer"].get("$defs").is_none());
        assert!(
            model
                .validate(args(json!({"outer": {"inner": {"value": 1}, "more": []}})))
                .is_ok()
        );
    }
}
