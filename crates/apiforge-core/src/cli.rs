//! Output format and exit status shared by the `apiforge` commands.
//!
//! # Examples
//!
//! ```
//! use apiforge_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "JSON".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//! assert_eq!(ExitCode::PARTIAL.as_i32(), 3);
//! ```

use std::str::FromStr;

/// How a command prints its result summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// One `key: value` line per field
    Text,
    /// Colored text for terminals
    Pretty,
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(crate::Error::InvalidArgument(format!(
                "unknown output format '{s}', expected json, text or pretty"
            ))),
        }
    }
}

/// Process exit status of a command that ran to completion.
///
/// Failures surface as errors instead and exit with status 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Everything was done.
    pub const SUCCESS: Self = Self(0);

    /// Finished, but some items were skipped.
    pub const PARTIAL: Self = Self(3);

    /// Status passed to the process.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}
