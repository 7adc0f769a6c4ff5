//! Error types for apiforge.
//!
//! A single error hierarchy shared by the loader, the compiler and the CLI.
//! Each variant carries enough context to point at the offending document
//! location or operation.
//!
//! # Examples
//!
//! ```
//! use apiforge_core::{Error, Result};
//!
//! fn require_title(title: Option<&str>) -> Result<&str> {
//!     title.ok_or_else(|| Error::MissingField {
//!         field: "info.title".to_string(),
//!     })
//! }
//!
//! let err = require_title(None).unwrap_err();
//! assert!(err.is_missing_field());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for apiforge.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A document could not be parsed as JSON or YAML.
    #[error("failed to parse {format} document: {message}")]
    Parse {
        /// Format that was attempted (`json`, `yaml`, `toml`)
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// A required top-level field is absent.
    ///
    /// Aborts the whole generation run.
    #[error("required field '{field}' is missing")]
    MissingField {
        /// Dotted path of the missing field
        field: String,
    },

    /// The document is structurally invalid.
    #[error("invalid schema at {location}: {reason}")]
    InvalidSchema {
        /// JSON pointer or operation label
        location: String,
        /// What is wrong
        reason: String,
    },

    /// An operation references a schema that could not be dereferenced.
    #[error("unresolved reference '{reference}' in {operation}")]
    UnresolvedReference {
        /// Operation label, e.g. `GET /pets`
        operation: String,
        /// The reference pointer
        reference: String,
    },

    /// Name-collision suffixing ran out of candidates.
    #[error("could not find a free name for '{name}' after {attempts} attempts")]
    NameCollision {
        /// The base identifier
        name: String,
        /// Number of candidates tried
        attempts: usize,
    },

    /// Template registration or rendering failed.
    #[error("template error: {message}")]
    Template {
        /// Handlebars message
        message: String,
    },

    /// Serialization failed.
    #[error("serialization error: {message}")]
    SerializationError {
        /// Description of the failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration is invalid.
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid CLI or function argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Builds an [`Error::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is a missing-field error.
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }

    /// Returns `true` if this is a parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Returns `true` if this is an unresolved-reference error.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiforge_core::Error;
    ///
    /// let err = Error::UnresolvedReference {
    ///     operation: "GET /pets".to_string(),
    ///     reference: "#/components/schemas/Missing".to_string(),
    /// };
    /// assert!(err.is_unresolved_reference());
    /// ```
    #[must_use]
    pub const fn is_unresolved_reference(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }

    /// Returns `true` if this is a name-collision error.
    #[must_use]
    pub const fn is_name_collision(&self) -> bool {
        matches!(self, Self::NameCollision { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if the error only affects one operation.
    ///
    /// Operation-scoped errors are logged and the operation is skipped;
    /// every other error aborts the run.
    #[must_use]
    pub const fn is_operation_scoped(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. } | Self::NameCollision { .. } | Self::InvalidSchema { .. }
        )
    }
}

/// Result type alias for apiforge operations.
pub type Result<T> = std::result::Result<T, Error>;
