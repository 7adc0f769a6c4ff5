//! OpenAPI 3.0 schema keywords rewritten as JSON Schema 2020-12.
//!
//! OpenAPI 3.0 writes `exclusiveMinimum: true` next to `minimum` and marks
//! optional nulls with `nullable: true`. Neither compiles under a 2020-12
//! validator, so declared schemas pass through [`normalize`] first.

use serde_json::{Map, Value, json};

/// Keywords holding one subschema, or a list of them for tuple `items`.
const SUBSCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "additionalProperties",
    "not",
    "contains",
    "propertyNames",
    "if",
    "then",
    "else",
    "unevaluatedItems",
    "unevaluatedProperties",
    "allOf",
    "anyOf",
    "oneOf",
    "prefixItems",
];

/// Keywords mapping names to subschemas.
const SUBSCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Annotations kept on the outside when a schema is wrapped in `anyOf`.
const ANNOTATIONS: &[&str] = &["title", "description", "default", "examples", "deprecated"];

/// Rewrites OpenAPI 3.0 keywords at every schema position of `schema`.
///
/// - Boolean `exclusiveMinimum`/`exclusiveMaximum` take the value of the
///   sibling `minimum`/`maximum`, or vanish when it is absent or the flag
///   is `false`
/// - `nullable: true` adds `"null"` to `type` (and `null` to `enum`), or
///   wraps an untyped schema in `anyOf` with a null branch
///
/// Literal payloads such as `default`, `example` and `enum` are never
/// rewritten.
#[must_use]
pub fn normalize(mut schema: Value) -> Value {
    normalize_in_place(&mut schema);
    schema
}

fn normalize_in_place(schema: &mut Value) {
    let Value::Object(object) = schema else {
        return;
    };

    for (keyword, value) in object.iter_mut() {
        if SUBSCHEMA_KEYWORDS.contains(&keyword.as_str()) {
            match value {
                Value::Array(items) => items.iter_mut().for_each(normalize_in_place),
                value => normalize_in_place(value),
            }
        } else if SUBSCHEMA_MAP_KEYWORDS.contains(&keyword.as_str())
            && let Value::Object(entries) = value
        {
            entries.values_mut().for_each(normalize_in_place);
        }
    }

    exclusive_bound(object, "exclusiveMinimum", "minimum");
    exclusive_bound(object, "exclusiveMaximum", "maximum");
    if nullable(object) {
        let wrapped = std::mem::take(object);
        *object = null_union(wrapped);
    }
}

fn exclusive_bound(object: &mut Map<String, Value>, exclusive: &str, inclusive: &str) {
    let Some(Value::Bool(flag)) = object.get(exclusive) else {
        return;
    };
    let flag = *flag;
    object.remove(exclusive);
    if flag && let Some(bound) = object.remove(inclusive) {
        object.insert(exclusive.to_string(), bound);
    }
}

/// Folds `nullable` into the schema; returns `true` if it still needs a
/// null branch.
fn nullable(object: &mut Map<String, Value>) -> bool {
    if object.remove("nullable") != Some(Value::Bool(true)) {
        return false;
    }

    if let Some(Value::Array(values)) = object.get_mut("enum")
        && !values.contains(&Value::Null)
    {
        values.push(Value::Null);
    }

    match object.get_mut("type") {
        Some(Value::String(name)) => {
            let name = std::mem::take(name);
            object.insert("type".to_string(), json!([name, "null"]));
            false
        }
        Some(Value::Array(types)) => {
            if !types.iter().any(|t| t == "null") {
                types.push(json!("null"));
            }
            false
        }
        _ => true,
    }
}

fn null_union(mut schema: Map<String, Value>) -> Map<String, Value> {
    let mut outer = Map::new();
    for annotation in ANNOTATIONS {
        if let Some(value) = schema.remove(*annotation) {
            outer.insert((*annotation).to_string(), value);
        }
    }
    outer.insert(
        "anyOf".to_string(),
        json!([Value::Object(schema), {"type": "null"}]),
    );
    outer
}
