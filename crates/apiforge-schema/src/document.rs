//! Loading and validating OpenAPI documents.

use crate::resolver;
use apiforge_core::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Source format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text
    Json,
    /// YAML text
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension, sniffing the content when the
    /// extension is missing or unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiforge_schema::DocumentFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(DocumentFormat::detect(Path::new("api.yml"), "{}"), DocumentFormat::Yaml);
    /// assert_eq!(DocumentFormat::detect(Path::new("api"), "  {\"a\": 1}"), DocumentFormat::Json);
    /// assert_eq!(DocumentFormat::detect(Path::new("api.txt"), "openapi: 3.0.0"), DocumentFormat::Yaml);
    /// ```
    #[must_use]
    pub fn detect(path: &Path, content: &str) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("yaml" | "yml") => Self::Yaml,
            _ if content.trim_start().starts_with('{') => Self::Json,
            _ => Self::Yaml,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// A fully dereferenced API description.
///
/// Holds no `$ref` nodes. Key order of the source is preserved, so paths and
/// verbs iterate in document order.
///
/// # Examples
///
/// ```
/// use apiforge_schema::SchemaDocument;
///
/// let doc = SchemaDocument::from_str(
///     r#"{"openapi": "3.0.0", "info": {"title": "Pets"}, "paths": {"/pets": {"get": {}}}}"#,
///     apiforge_schema::DocumentFormat::Json,
/// )
/// .unwrap();
///
/// assert_eq!(doc.title(), "Pets");
/// assert_eq!(doc.base_url(), "");
/// assert_eq!(doc.paths().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    root: Value,
    title: String,
    base_url: String,
}

impl SchemaDocument {
    /// Loads a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Parse`] if
    /// it is not valid JSON/YAML, and [`Error::MissingField`] if `info.title`
    /// is absent.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let format = DocumentFormat::detect(path, &content);
        tracing::debug!("Loading {} as {}", path.display(), format.name());
        Self::from_str(&content, format)
    }

    /// Parses a document from text in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed input, or any error of
    /// [`SchemaDocument::from_value`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str, format: DocumentFormat) -> Result<Self> {
        let value = match format {
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| Error::Parse {
                format: format.name(),
                message: e.to_string(),
            })?,
            DocumentFormat::Yaml => {
                let yaml: serde_yaml::Value =
                    serde_yaml::from_str(content).map_err(|e| Error::Parse {
                        format: format.name(),
                        message: e.to_string(),
                    })?;
                yaml_to_json(yaml)
            }
        };
        Self::from_value(&value)
    }

    /// Resolves and validates an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the root is not an object and
    /// [`Error::MissingField`] if `info.title` is absent or empty.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidSchema {
                location: "#".to_string(),
                reason: "document root must be an object".to_string(),
            });
        }

        let title = value
            .pointer("/info/title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| Error::MissingField {
                field: "info.title".to_string(),
            })?
            .to_string();

        if value.get("paths").is_none() {
            tracing::warn!("Document '{title}' declares no paths");
        }

        let root = resolver::resolve(value);
        let base_url = root
            .pointer("/servers/0/url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        tracing::info!(
            "Loaded '{}' with {} paths",
            title,
            root.get("paths").and_then(serde_json::Value::as_object).map_or(0, Map::len)
        );

        Ok(Self {
            root,
            title,
            base_url,
        })
    }

    /// Returns `info.title`.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns `servers[0].url`, or an empty string.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `info.description`, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.root.pointer("/info/description").and_then(Value::as_str)
    }

    /// Iterates path items in document order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|paths| paths.iter())
            .filter_map(|(path, item)| item.as_object().map(|item| (path.as_str(), item)))
    }

    /// Returns the resolved document tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }
}

/// Converts YAML into JSON, stringifying non-string mapping keys such as
/// numeric response codes.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tagged = *tagged;
            yaml_to_json(tagged.value)
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
