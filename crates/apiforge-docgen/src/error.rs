//! Error types for documentation generation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating documentation blocks.
#[derive(Error, Debug)]
pub enum DocgenError {
    /// Reading or writing the source file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being processed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The source could not be parsed as TypeScript.
    #[error("failed to parse TypeScript source: {0}")]
    Parse(String),

    /// The API key environment variable is unset or empty.
    #[error("environment variable {var} is not set")]
    MissingApiKey {
        /// Variable name
        var: String,
    },

    /// The model API could not be reached.
    #[error("model request failed: {0}")]
    Transport(String),

    /// The model API answered with an error status.
    #[error("model API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The model answered without usable documentation.
    #[error("model returned no documentation for '{function}'")]
    EmptyResponse {
        /// Function being documented
        function: String,
    },

    /// Every attempt for one function failed.
    #[error("giving up on '{function}' after {attempts} attempts: {last}")]
    Exhausted {
        /// Function being documented
        function: String,
        /// Attempts made
        attempts: usize,
        /// Message of the final failure
        last: String,
    },

    /// Invalid docgen settings.
    #[error(transparent)]
    Config(#[from] apiforge_core::Error),
}

impl DocgenError {
    /// Returns `true` if another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::EmptyResponse { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for docgen operations.
pub type Result<T> = std::result::Result<T, DocgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(DocgenError::Transport("reset".to_string()).is_retryable());
        assert!(
            DocgenError::Api {
                status: 529,
                message: "overloaded".to_string()
            }
            .is_retryable()
        );
        assert!(
            !DocgenError::Api {
                status: 401,
                message: "bad key".to_string()
            }
            .is_retryable()
        );
        assert!(!DocgenError::Parse("no tree".to_string()).is_retryable());
        assert!(
            !DocgenError::MissingApiKey {
                var: "KEY".to_string()
            }
            .is_retryable()
        );
    }
}
