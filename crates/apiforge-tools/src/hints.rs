//! Documentation type hints.
//!
//! Maps the free-text hints of documentation blocks (`string`,
//! `list of integers`, `file`, ...) onto a closed set of field types through
//! an explicit lookup table. Anything the table does not know becomes
//! [`FieldType::Untyped`].
//!
//! # Examples
//!
//! ```
//! use apiforge_tools::FieldType;
//!
//! assert_eq!(FieldType::from_hint("integer"), FieldType::Integer);
//! assert_eq!(
//!     FieldType::from_hint("list of strings"),
//!     FieldType::Array(Some(Box::new(FieldType::String)))
//! );
//! assert_eq!(FieldType::from_hint("frobnicator"), FieldType::Untyped);
//! ```

use serde_json::{Value, json};

/// Canonical field types a hint can name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// JSON string
    String,
    /// JSON integer
    Integer,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
    /// JSON object
    Object,
    /// JSON array, optionally with a known item type
    Array(Option<Box<Self>>),
    /// Uploaded file content
    File,
    /// No usable hint. Advertised as a string, validated as anything.
    Untyped,
}

const HINT_TABLE: &[(&str, FieldType)] = &[
    ("str", FieldType::String),
    ("string", FieldType::String),
    ("text", FieldType::String),
    ("int", FieldType::Integer),
    ("integer", FieldType::Integer),
    ("float", FieldType::Number),
    ("number", FieldType::Number),
    ("bool", FieldType::Boolean),
    ("boolean", FieldType::Boolean),
    ("dict", FieldType::Object),
    ("map", FieldType::Object),
    ("object", FieldType::Object),
    ("list", FieldType::Array(None)),
    ("array", FieldType::Array(None)),
    ("file", FieldType::File),
    ("binary", FieldType::File),
];

impl FieldType {
    /// Looks up a documentation hint. Unknown hints are [`FieldType::Untyped`].
    #[must_use]
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim().to_ascii_lowercase();

        for prefix in ["list of ", "array of "] {
            if let Some(item) = hint.strip_prefix(prefix) {
                let item = match Self::from_hint(item) {
                    Self::Untyped => Self::from_hint(item.strip_suffix('s').unwrap_or(item)),
                    known => known,
                };
                return Self::Array(match item {
                    Self::Untyped => None,
                    item => Some(Box::new(item)),
                });
            }
        }

        HINT_TABLE
            .iter()
            .find(|(name, _)| *name == hint)
            .map_or(Self::Untyped, |(_, field_type)| field_type.clone())
    }

    /// Returns `true` for the fallback type.
    #[must_use]
    pub const fn is_untyped(&self) -> bool {
        matches!(self, Self::Untyped)
    }

    /// JSON Schema advertised to tool consumers.
    #[must_use]
    pub fn schema(&self) -> Value {
        match self {
            Self::String | Self::Untyped => json!({"type": "string"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Object => json!({"type": "object"}),
            Self::File => json!({"type": "string", "format": "binary"}),
            Self::Array(None) => json!({"type": "array"}),
            Self::Array(Some(item)) => json!({"type": "array", "items": item.schema()}),
        }
    }

    /// JSON Schema arguments are validated against.
    ///
    /// Equal to [`schema`](Self::schema) except that untyped positions
    /// accept any value.
    #[must_use]
    pub fn validation_schema(&self) -> Value {
        match self {
            Self::Untyped => json!({}),
            Self::Array(Some(item)) => json!({"type": "array", "items": item.validation_schema()}),
            other => other.schema(),
        }
    }
}
