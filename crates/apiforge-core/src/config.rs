//! Configuration for client generation and documentation synthesis.
//!
//! Configuration comes from an optional `apiforge.toml`; CLI flags override
//! whatever the file sets.
//!
//! ```toml
//! class_name = "PetstoreClient"
//! split = true
//!
//! [docgen]
//! model = "claude-sonnet-4-5"
//! max_concurrency = 8
//! ```
//!
//! # Examples
//!
//! ```
//! use apiforge_core::GeneratorConfig;
//!
//! let config = GeneratorConfig::builder()
//!     .class_name("PetstoreClient")
//!     .split(true)
//!     .build();
//!
//! assert_eq!(config.class_name.as_deref(), Some("PetstoreClient"));
//! assert!(config.split);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "apiforge.toml";

/// Client generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Name of the generated client class.
    ///
    /// Default: PascalCase of `info.title` followed by `Client`.
    pub class_name: Option<String>,

    /// Base URL baked into the client constructor.
    ///
    /// Default: `servers[0].url` of the document.
    pub base_url: Option<String>,

    /// Split the client into topic segments.
    /// Default: false
    pub split: bool,

    /// Write the client IR beside the generated source so it can be split later.
    /// Default: true
    pub emit_ir: bool,

    /// Documentation synthesis settings.
    pub docgen: DocgenConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            class_name: None,
            base_url: None,
            split: false,
            emit_ir: true,
            docgen: DocgenConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::default()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not valid TOML or contains
    /// unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiforge_core::GeneratorConfig;
    ///
    /// let config = GeneratorConfig::from_toml_str("split = true").unwrap();
    /// assert!(config.split);
    /// assert!(config.emit_ir);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Parse {
            format: "toml",
            message: e.to_string(),
        })
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Finds and loads the effective configuration.
    ///
    /// Lookup order: `explicit`, `./apiforge.toml`, then
    /// `<config dir>/apiforge/config.toml`. Falls back to defaults when no
    /// file exists. An explicit path that does not exist is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a found file cannot be read or parsed.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Self::load(path);
        }

        for candidate in Self::candidate_paths() {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("apiforge").join("config.toml"));
        }
        paths
    }
}

/// Settings for model-assisted documentation generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocgenConfig {
    /// Model identifier sent to the API.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Functions documented concurrently.
    /// Default: 4
    pub max_concurrency: usize,

    /// Attempts per function before giving up on it.
    /// Default: 3
    pub max_attempts: usize,
}

impl Default for DocgenConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_concurrency: 4,
            max_attempts: 3,
        }
    }
}

impl DocgenConfig {
    /// Checks the settings for impossible values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if concurrency or attempts is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::ConfigError {
                message: "docgen.max_concurrency must be at least 1".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::ConfigError {
                message: "docgen.max_attempts must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Sets the client class name.
    #[must_use]
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.config.class_name = Some(name.into());
        self
    }

    /// Overrides the document's base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Enables or disables segment splitting.
    #[must_use]
    pub const fn split(mut self, split: bool) -> Self {
        self.config.split = split;
        self
    }

    /// Enables or disables writing the IR sidecar.
    #[must_use]
    pub const fn emit_ir(mut self, emit_ir: bool) -> Self {
        self.config.emit_ir = emit_ir;
        self
    }

    /// Replaces the docgen settings.
    #[must_use]
    pub fn docgen(mut self, docgen: DocgenConfig) -> Self {
        self.config.docgen = docgen;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert!(config.class_name.is_none());
        assert!(!config.split);
        assert!(config.emit_ir);
        assert_eq!(config.docgen.max_concurrency, 4);
        assert_eq!(config.docgen.api_key_env, "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_from_toml_with_docgen_section() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            class_name = "Pets"

            [docgen]
            model = "local-model"
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.class_name.as_deref(), Some("Pets"));
        assert_eq!(config.docgen.model, "local-model");
        assert_eq!(config.docgen.max_attempts, 5);
        assert_eq!(config.docgen.max_concurrency, 4);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = GeneratorConfig::from_toml_str("splitt = true").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_discover_explicit_missing_file() {
        let err = GeneratorConfig::discover(Some(Path::new("/nonexistent/apiforge.toml")))
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://example.com\"").unwrap();

        let config = GeneratorConfig::discover(Some(file.path())).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_docgen_validation() {
        let docgen = DocgenConfig {
            max_concurrency: 0,
            ..DocgenConfig::default()
        };
        assert!(docgen.validate().is_err());
        assert!(DocgenConfig::default().validate().is_ok());
    }
}
