//! Reference inlining and composition merging.
//!
//! Every local `$ref` is replaced by a resolved copy of its target, so the
//! result contains no reference nodes. Cycles and excessive nesting are cut
//! with [`CIRCULAR_MARKER`]; references that cannot be followed become
//! [`UNRESOLVED_MARKER`] nodes.

use serde_json::{Map, Value, json};
use std::collections::HashMap;

/// Key marking a node where a reference cycle or the depth limit was cut.
pub const CIRCULAR_MARKER: &str = "x-circular-ref";

/// Key marking a node whose reference could not be followed.
pub const UNRESOLVED_MARKER: &str = "x-unresolved-ref";

/// Nesting depth past which resolution stops.
pub const MAX_DEPTH: usize = 64;

/// Keywords whose value maps names to schemas. Their keys are names, so
/// no keyword rewrite applies to the map itself.
const NAMED_SCHEMA_MAPS: &[&str] = &[
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
    "schemas",
];

/// Keywords whose value is literal data, never a schema.
const LITERAL_KEYWORDS: &[&str] = &["example", "examples", "default", "enum", "const"];

/// Returns a copy of `root` with all references inlined and compositions
/// merged.
///
/// Type arrays and `allOf`/`oneOf`/`anyOf` are rewritten only where a
/// schema can appear: never for the keys of a `properties` map, and never
/// inside `example`, `default` or `enum` payloads. Each reference target is
/// resolved once and reused.
///
/// # Examples
///
/// ```
/// use apiforge_schema::resolve;
/// use serde_json::json;
///
/// let doc = json!({
///     "components": {"schemas": {"Id": {"type": "integer"}}},
///     "schema": {"$ref": "#/components/schemas/Id"}
/// });
///
/// let resolved = resolve(&doc);
/// assert_eq!(resolved["schema"], json!({"type": "integer"}));
/// ```
#[must_use]
pub fn resolve(root: &Value) -> Value {
    let mut resolver = Resolver {
        root,
        stack: Vec::new(),
        cache: HashMap::new(),
        cuts: 0,
    };
    resolver.resolve_node(root, 0, Position::Schema)
}

/// Returns the first unresolved reference pointer found under `node`.
#[must_use]
pub fn find_unresolved(node: &Value) -> Option<&str> {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(pointer)) = map.get(UNRESOLVED_MARKER) {
                return Some(pointer);
            }
            map.values().find_map(find_unresolved)
        }
        Value::Array(items) => items.iter().find_map(find_unresolved),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// A schema or a document object that may hold one.
    Schema,
    /// A map from names to schemas.
    Names,
    /// Literal data.
    Literal,
}

impl Position {
    fn of_child(self, key: &str) -> Self {
        match self {
            Self::Literal => Self::Literal,
            Self::Names => Self::Schema,
            Self::Schema => {
                if LITERAL_KEYWORDS.contains(&key) {
                    Self::Literal
                } else if NAMED_SCHEMA_MAPS.contains(&key) {
                    Self::Names
                } else {
                    Self::Schema
                }
            }
        }
    }
}

/// A resolved reference target and the depth it was resolved at.
struct Resolved {
    depth: usize,
    value: Value,
}

struct Resolver<'a> {
    root: &'a Value,
    stack: Vec<String>,
    cache: HashMap<String, Resolved>,
    /// Cycle and depth cuts made so far.
    cuts: usize,
}

impl Resolver<'_> {
    fn resolve_node(&mut self, node: &Value, depth: usize, position: Position) -> Value {
        if depth > MAX_DEPTH {
            let at = self.stack.last().map_or("#", String::as_str).to_string();
            tracing::debug!("Depth limit reached below {at}");
            self.cuts += 1;
            return circular(&at);
        }

        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    let resolved = self.resolve_ref(reference, depth, position);
                    return overlay_siblings(resolved, map, |key, value| {
                        self.resolve_node(value, depth + 1, position.of_child(key))
                    });
                }

                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(
                        key.clone(),
                        self.resolve_node(value, depth + 1, position.of_child(key)),
                    );
                }
                if position == Position::Schema {
                    normalize_type_array(&mut out);
                    merge_all_of(&mut out);
                    collapse_variants(&mut out, "oneOf");
                    collapse_variants(&mut out, "anyOf");
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                let position = if position == Position::Literal {
                    Position::Literal
                } else {
                    Position::Schema
                };
                Value::Array(
                    items
                        .iter()
                        .map(|item| self.resolve_node(item, depth + 1, position))
                        .collect(),
                )
            }
            other => other.clone(),
        }
    }

    fn resolve_ref(&mut self, reference: &str, depth: usize, position: Position) -> Value {
        let Some(pointer) = reference.strip_prefix('#') else {
            tracing::warn!("External reference {reference} is not supported");
            return unresolved(reference);
        };

        if self.stack.iter().any(|seen| seen == reference) {
            tracing::debug!("Cutting reference cycle at {reference}");
            self.cuts += 1;
            return circular(reference);
        }

        // A target resolved without cuts is the same at any shallower depth.
        if position == Position::Schema
            && let Some(cached) = self.cache.get(reference)
            && depth <= cached.depth
        {
            return cached.value.clone();
        }

        let Some(target) = self.root.pointer(pointer) else {
            tracing::warn!("Reference {reference} points at nothing");
            return unresolved(reference);
        };

        let cuts = self.cuts;
        self.stack.push(reference.to_string());
        // Targets keep the position of the reference, so shared examples
        // are copied as data.
        let resolved = self.resolve_node(target, depth + 1, position);
        self.stack.pop();

        if position == Position::Schema && self.cuts == cuts {
            self.cache.insert(
                reference.to_string(),
                Resolved {
                    depth,
                    value: resolved.clone(),
                },
            );
        }
        resolved
    }
}

fn circular(pointer: &str) -> Value {
    json!({"type": "object", CIRCULAR_MARKER: pointer})
}

fn unresolved(pointer: &str) -> Value {
    json!({UNRESOLVED_MARKER: pointer})
}

/// Keys written next to a `$ref` (such as `description`) take precedence
/// over the target's.
fn overlay_siblings(
    resolved: Value,
    reference_node: &Map<String, Value>,
    mut resolve: impl FnMut(&str, &Value) -> Value,
) -> Value {
    let Value::Object(mut target) = resolved else {
        return resolved;
    };
    for (key, value) in reference_node {
        if key != "$ref" {
            target.insert(key.clone(), resolve(key, value));
        }
    }
    Value::Object(target)
}

/// Rewrites `type: [X, "null"]` into `type: X, nullable: true`.
fn normalize_type_array(schema: &mut Map<String, Value>) {
    let Some(Value::Array(types)) = schema.get("type") else {
        return;
    };
    let non_null: Vec<Value> = types
        .iter()
        .filter(|t| t.as_str() != Some("null"))
        .cloned()
        .collect();
    let had_null = non_null.len() != types.len();

    if let [single] = non_null.as_slice() {
        schema.insert("type".to_string(), single.clone());
    }
    if had_null {
        schema.insert("nullable".to_string(), Value::Bool(true));
    }
}

fn merge_all_of(schema: &mut Map<String, Value>) {
    let Some(Value::Array(members)) = schema.remove("allOf") else {
        return;
    };
    for member in members {
        if let Value::Object(member) = member {
            absorb(schema, member, RequiredMerge::Union);
        }
    }
}

fn collapse_variants(schema: &mut Map<String, Value>, key: &str) {
    let Some(Value::Array(variants)) = schema.get(key) else {
        return;
    };

    let non_null: Vec<&Value> = variants.iter().filter(|v| !is_null_schema(v)).collect();
    let nullable = non_null.len() < variants.len();

    let collapsed: Option<Map<String, Value>> = if non_null.len() == 1 {
        non_null[0].as_object().cloned()
    } else if !non_null.is_empty() && non_null.iter().all(|v| is_object_schema(v)) {
        let mut merged = Map::new();
        for (index, variant) in non_null.iter().enumerate() {
            if let Some(variant) = variant.as_object() {
                let rule = if index == 0 {
                    RequiredMerge::Union
                } else {
                    if !variant.contains_key("required") {
                        merged.insert("required".to_string(), Value::Array(Vec::new()));
                    }
                    RequiredMerge::Intersection
                };
                absorb(&mut merged, variant.clone(), rule);
            }
        }
        Some(merged)
    } else {
        non_null.first().and_then(|v| v.as_object()).cloned()
    };

    schema.remove(key);
    if let Some(collapsed) = collapsed {
        absorb(schema, collapsed, RequiredMerge::Union);
    }
    if nullable {
        schema.insert("nullable".to_string(), Value::Bool(true));
    }
}

#[derive(Clone, Copy)]
enum RequiredMerge {
    Union,
    Intersection,
}

/// Folds `member` into `target`: properties merge in order, `required`
/// combines per `rule`, and any other key keeps its first value.
fn absorb(target: &mut Map<String, Value>, member: Map<String, Value>, rule: RequiredMerge) {
    for (key, value) in member {
        match value {
            Value::Object(properties) if key == "properties" => {
                let entry = target
                    .entry("properties")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(existing) = entry {
                    for (name, property) in properties {
                        existing.insert(name, property);
                    }
                }
            }
            Value::Array(required) if key == "required" => {
                let merged = match (rule, target.get("required")) {
                    (RequiredMerge::Union, Some(Value::Array(existing))) => {
                        let mut merged = existing.clone();
                        for name in required {
                            if !merged.contains(&name) {
                                merged.push(name);
                            }
                        }
                        merged
                    }
                    (RequiredMerge::Intersection, Some(Value::Array(existing))) => existing
                        .iter()
                        .filter(|name| required.contains(name))
                        .cloned()
                        .collect(),
                    (RequiredMerge::Intersection, _) => Vec::new(),
                    (RequiredMerge::Union, _) => required,
                };
                target.insert("required".to_string(), Value::Array(merged));
            }
            value => {
                target.entry(key).or_insert(value);
            }
        }
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn is_object_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
        || schema.get("properties").is_some()
}
