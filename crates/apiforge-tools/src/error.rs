//! Error types for tool registration and invocation.
//!
//! [`ToolError`] separates build-time configuration problems, rejected
//! arguments and failures raised by the callable itself. [`RequestError`]
//! covers the request life cycle of generated API methods.
//!
//! # Examples
//!
//! ```
//! use apiforge_tools::ToolError;
//!
//! let err = ToolError::InvalidArguments {
//!     tool: "get_pet".to_string(),
//!     errors: vec!["/petId: \"x\" is not of type \"integer\"".to_string()],
//! };
//! assert!(err.is_invalid_arguments());
//! assert_eq!(err.to_structured()["error"]["kind"], "invalid_arguments");
//! ```

use serde_json::{Value, json};
use thiserror::Error;

/// Errors raised by the tool registry.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("tool not found: {name}")]
    NotFound {
        /// Requested tool name
        name: String,
    },

    /// The callable cannot be exposed as a tool.
    ///
    /// Raised when the tool is built, never at call time.
    #[error("invalid tool '{tool}': {reason}")]
    Configuration {
        /// Tool name
        tool: String,
        /// What is wrong
        reason: String,
    },

    /// Arguments failed validation; the callable was not invoked.
    #[error("invalid arguments for '{tool}': {}", errors.join("; "))]
    InvalidArguments {
        /// Tool name
        tool: String,
        /// One message per violation
        errors: Vec<String>,
    },

    /// A generated API method failed.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The callable itself failed.
    #[error("tool failed: {message}")]
    Failed {
        /// Failure description
        message: String,
    },
}

impl ToolError {
    /// Builds a [`ToolError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns `true` for unknown tools.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for build-time configuration errors.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns `true` if the arguments were rejected before invocation.
    #[must_use]
    pub const fn is_invalid_arguments(&self) -> bool {
        matches!(self, Self::InvalidArguments { .. })
    }

    /// Returns a stable machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Configuration { .. } => "configuration",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::Request(e) => e.kind(),
            Self::Failed { .. } => "failed",
        }
    }

    /// Renders the error as `{"error": {"kind", "message", ...}}`.
    #[must_use]
    pub fn to_structured(&self) -> Value {
        let mut error = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        match self {
            Self::InvalidArguments { tool, errors } => {
                error["tool"] = json!(tool);
                error["errors"] = json!(errors);
            }
            Self::Configuration { tool, .. } => error["tool"] = json!(tool),
            Self::Request(RequestError::MissingParameter(name)) => {
                error["parameter"] = json!(name);
            }
            Self::Request(RequestError::Status { status, body }) => {
                error["status"] = json!(status);
                error["body"] = json!(body);
            }
            _ => {}
        }
        json!({ "error": error })
    }
}

/// Errors raised while executing a generated API method.
#[derive(Error, Debug)]
pub enum RequestError {
    /// A required argument was null or absent; nothing was sent.
    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    /// The transport could not complete the exchange.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server answered with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// The response body is not valid JSON.
    #[error("response is not valid JSON: {source}")]
    Decode {
        /// Parser error
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// Returns a stable machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "missing_parameter",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "http_status",
            Self::Decode { .. } => "decode",
        }
    }

    /// Returns `true` for failures detected before anything was sent.
    #[must_use]
    pub const fn is_missing_parameter(&self) -> bool {
        matches!(self, Self::MissingParameter(_))
    }

    /// Returns `true` for transport and status failures.
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;
