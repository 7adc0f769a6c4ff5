//! TypeScript type mapping and literal helpers.
//!
//! # Examples
//!
//! ```
//! use apiforge_codegen::typescript::{json_schema_to_typescript, to_pascal_case};
//! use serde_json::json;
//!
//! let schema = json!({"type": "array", "items": {"type": "integer"}});
//! assert_eq!(json_schema_to_typescript(&schema), "number[]");
//! assert_eq!(to_pascal_case("swagger petstore"), "SwaggerPetstore");
//! ```

use serde_json::Value;

/// Words that cannot be used as TypeScript parameter names.
pub const RESERVED_WORDS: &[&str] = &[
    "any", "arguments", "as", "await", "boolean", "break", "case", "catch", "class", "const",
    "constructor", "continue", "debugger", "declare", "default", "delete", "do", "else", "enum",
    "eval", "export", "extends", "false", "finally", "for", "from", "function", "get", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "module", "namespace", "new",
    "null", "number", "of", "package", "private", "protected", "public", "require", "return",
    "set", "static", "string", "super", "switch", "symbol", "this", "throw", "true", "try",
    "type", "typeof", "undefined", "var", "void", "while", "with", "yield",
];

/// Returns `true` for TypeScript reserved words.
#[must_use]
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Converts words separated by non-alphanumerics or underscores into
/// PascalCase.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::typescript::to_pascal_case;
///
/// assert_eq!(to_pascal_case("send_message"), "SendMessage");
/// assert_eq!(to_pascal_case("Swagger Petstore - OpenAPI 3.0"), "SwaggerPetstoreOpenAPI30");
/// assert_eq!(to_pascal_case("pet"), "Pet");
/// ```
#[must_use]
pub fn to_pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

/// Maps a JSON Schema primitive type name to TypeScript.
#[must_use]
pub fn json_type_to_typescript(json_type: &str) -> &'static str {
    match json_type {
        "string" => "string",
        "number" | "integer" => "number",
        "boolean" => "boolean",
        "array" => "unknown[]",
        "object" => "Record<string, unknown>",
        "null" => "null",
        _ => "unknown",
    }
}

/// Returns `true` for string schemas carrying binary content.
#[must_use]
pub fn is_binary_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("string")
        && matches!(
            schema.get("format").and_then(Value::as_str),
            Some("binary" | "base64")
        )
}

/// Converts a JSON Schema into a single-line TypeScript type.
///
/// Objects with properties become inline object types; binary strings
/// become `Blob`; string enums become unions of literals.
#[must_use]
pub fn json_schema_to_typescript(schema: &Value) -> String {
    let Value::Object(obj) = schema else {
        return "unknown".to_string();
    };

    if is_binary_schema(schema) {
        return "Blob".to_string();
    }

    let base = match obj.get("type").and_then(Value::as_str).unwrap_or("unknown") {
        "object" | "unknown" if obj.contains_key("properties") => {
            let required: Vec<&str> = obj
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let fields: Vec<String> = obj
                .get("properties")
                .and_then(Value::as_object)
                .into_iter()
                .flatten()
                .map(|(name, property)| {
                    let marker = if required.contains(&name.as_str()) { "" } else { "?" };
                    format!(
                        "{}{marker}: {}",
                        property_key(name),
                        json_schema_to_typescript(property)
                    )
                })
                .collect();
            if fields.is_empty() {
                "Record<string, unknown>".to_string()
            } else {
                format!("{{ {} }}", fields.join("; "))
            }
        }
        "array" => match obj.get("items") {
            Some(items) => {
                let item = json_schema_to_typescript(items);
                if item.contains(' ') {
                    format!("Array<{item}>")
                } else {
                    format!("{item}[]")
                }
            }
            None => "unknown[]".to_string(),
        },
        "string" => match obj.get("enum").and_then(Value::as_array) {
            Some(values) if !values.is_empty() && values.iter().all(Value::is_string) => values
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
            _ => "string".to_string(),
        },
        other => json_type_to_typescript(other).to_string(),
    };

    if obj.get("nullable").and_then(Value::as_bool) == Some(true) && base != "unknown" {
        format!("{base} | null")
    } else {
        base
    }
}

/// Quotes `text` as a TypeScript string literal.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::typescript::string_literal;
///
/// assert_eq!(string_literal("a \"b\""), r#""a \"b\"""#);
/// ```
#[must_use]
pub fn string_literal(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn property_key(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        string_literal(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_mapping() {
        assert_eq!(json_schema_to_typescript(&json!({"type": "integer"})), "number");
        assert_eq!(json_schema_to_typescript(&json!({"type": "boolean"})), "boolean");
        assert_eq!(json_schema_to_typescript(&json!({})), "unknown");
        assert_eq!(json_schema_to_typescript(&json!("string")), "unknown");
    }

    #[test]
    fn test_object_inline_type() {
        let schema = json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}, "pet-name": {"type": "string"}},
            "required": ["id"]
        });
        assert_eq!(
            json_schema_to_typescript(&schema),
            "{ id: number; \"pet-name\"?: string }"
        );
    }

    #[test]
    fn test_array_of_objects_uses_generic_form() {
        let schema = json!({"type": "array", "items": {"type": "object", "properties": {"a": {"type": "string"}}}});
        assert_eq!(json_schema_to_typescript(&schema), "Array<{ a?: string }>");
    }

    #[test]
    fn test_enum_and_nullable() {
        let schema = json!({"type": "string", "enum": ["a", "b"], "nullable": true});
        assert_eq!(json_schema_to_typescript(&schema), "\"a\" | \"b\" | null");
    }

    #[test]
    fn test_binary_is_blob() {
        assert_eq!(
            json_schema_to_typescript(&json!({"type": "string", "format": "binary"})),
            "Blob"
        );
        assert!(is_binary_schema(&json!({"type": "string", "format": "base64"})));
        assert!(!is_binary_schema(&json!({"type": "string", "format": "date"})));
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("delete"));
        assert!(is_reserved_word("this"));
        assert!(!is_reserved_word("petId"));
    }
}
