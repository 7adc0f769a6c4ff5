//! Output containers for generated source files.
//!
//! # Examples
//!
//! ```
//! use apiforge_codegen::{GeneratedCode, GeneratedFile};
//!
//! let mut code = GeneratedCode::new();
//! code.add_file(GeneratedFile::new("client.ts", "export class Client {}"));
//!
//! assert_eq!(code.file_count(), 1);
//! assert!(code.file("client.ts").is_some());
//! ```

use apiforge_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All files produced by one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// Files in emission order
    pub files: Vec<GeneratedFile>,
}

impl GeneratedCode {
    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Adds a file.
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Returns the number of files.
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns an iterator over the files.
    #[inline]
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter()
    }

    /// Looks up a file by relative path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.path == path)
    }

    /// Writes every file below `root`, creating directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a directory or file cannot be written.
    pub fn write_to(&self, root: &Path) -> Result<()> {
        for file in &self.files {
            let target = root.join(&file.path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            std::fs::write(&target, &file.content).map_err(|e| Error::io(&target, e))?;
            tracing::debug!("Wrote {}", target.display());
        }
        Ok(())
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the output directory, `/`-separated
    pub path: String,
    /// File content
    pub content: String,
}

impl GeneratedFile {
    /// Creates a file entry.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}
