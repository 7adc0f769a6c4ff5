//! Concurrent documentation generation.
//!
//! Every undocumented function is an independent task: a semaphore bounds
//! how many run at once, each retries on its own, and a function that
//! fails is reported without holding back the others. Blocks are inserted
//! bottom-up so earlier line numbers stay valid.

use crate::error::{DocgenError, Result};
use crate::scanner::{FunctionSite, find_undocumented};
use crate::writer::DocWriter;
use apiforge_core::DocgenConfig;
use apiforge_docs::to_block_comment;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Concurrency and retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocgenOptions {
    /// Functions documented at once
    pub max_concurrency: usize,
    /// Attempts per function
    pub max_attempts: usize,
    /// Delay before the first retry; doubles after each failure
    pub retry_delay: Duration,
}

impl Default for DocgenOptions {
    fn default() -> Self {
        Self::from(&DocgenConfig::default())
    }
}

impl From<&DocgenConfig> for DocgenOptions {
    fn from(config: &DocgenConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.max(1),
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug)]
pub struct DocgenReport {
    /// Source with the new blocks inserted
    pub source: String,
    /// Functions that received a block, in source order
    pub documented: Vec<String>,
    /// Functions left undocumented, with the reason
    pub failed: Vec<(String, DocgenError)>,
}

impl DocgenReport {
    /// Returns `true` if the source changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.documented.is_empty()
    }
}

/// Inserts documentation blocks above every undocumented function.
///
/// # Errors
///
/// Returns [`DocgenError::Parse`] if the source cannot be scanned.
/// Per-function failures are reported in [`DocgenReport::failed`].
///
/// # Examples
///
/// ```
/// use apiforge_docgen::{DocWriter, DocgenOptions, FunctionSite, Result, generate_docs};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl DocWriter for Fixed {
///     async fn write_doc(&self, site: &FunctionSite) -> Result<String> {
///         Ok(format!("Runs {}.", site.name))
///     }
/// }
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
/// # rt.block_on(async {
/// let report = generate_docs("function go() {\n}\n", Arc::new(Fixed), &DocgenOptions::default()).await?;
/// assert_eq!(report.source, "/**\n * Runs go.\n */\nfunction go() {\n}\n");
/// # Ok::<(), apiforge_docgen::DocgenError>(())
/// # }).unwrap();
/// ```
pub async fn generate_docs(
    source: &str,
    writer: Arc<dyn DocWriter>,
    options: &DocgenOptions,
) -> Result<DocgenReport> {
    let sites = find_undocumented(source)?;
    tracing::info!("Documenting {} functions", sites.len());

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(sites.len());
    for site in sites {
        let semaphore = Arc::clone(&semaphore);
        let writer = Arc::clone(&writer);
        let options = options.clone();
        let name = site.name.clone();
        handles.push((name, tokio::spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => write_with_retry(writer.as_ref(), &site, &options).await,
                Err(e) => Err(DocgenError::Transport(e.to_string())),
            };
            (site, result)
        })));
    }

    let mut written: Vec<(FunctionSite, String)> = Vec::new();
    let mut failed = Vec::new();
    for (name, handle) in handles {
        match handle.await {
            Ok((site, Ok(text))) => written.push((site, text)),
            Ok((site, Err(e))) => {
                tracing::warn!(function = %site.name, "Documentation failed: {e}");
                failed.push((site.name, e));
            }
            Err(e) => {
                tracing::warn!(function = %name, "Documentation task aborted: {e}");
                failed.push((name, DocgenError::Transport(e.to_string())));
            }
        }
    }

    let documented = written.iter().map(|(site, _)| site.name.clone()).collect();
    Ok(DocgenReport {
        source: insert_blocks(source, written),
        documented,
        failed,
    })
}

/// Documents a file in place.
///
/// The file is rewritten only if at least one block was inserted.
///
/// # Errors
///
/// Returns [`DocgenError::Io`] if the file cannot be read or written and
/// [`DocgenError::Parse`] if it cannot be scanned. Per-function failures are reported in [`DocgenReport::failed`].
pub async fn document_file(
    path: &Path,
    writer: Arc<dyn DocWriter>,
    options: &DocgenOptions,
) -> Result<DocgenReport> {
    let io = |source| DocgenError::Io {
        path: path.to_path_buf(),
        source,
    };
    let source = tokio::fs::read_to_string(path).await.map_err(io)?;
    let report = generate_docs(&source, writer, options).await?;
    if report.changed() {
        tokio::fs::write(path, &report.source).await.map_err(io)?;
        tracing::info!(
            "Inserted {} documentation blocks into {}",
            report.documented.len(),
            path.display()
        );
    }
    Ok(report)
}

async fn write_with_retry(
    writer: &dyn DocWriter,
    site: &FunctionSite,
    options: &DocgenOptions,
) -> Result<String> {
    let mut delay = options.retry_delay;
    let mut attempt = 1;
    loop {
        match writer.write_doc(site).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt < options.max_attempts => {
                tracing::debug!(function = %site.name, attempt, "Retrying after: {e}");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                return Err(DocgenError::Exhausted {
                    function: site.name.clone(),
                    attempts: attempt,
                    last: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }
}

fn insert_blocks(source: &str, mut written: Vec<(FunctionSite, String)>) -> String {
    let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
    written.sort_by(|(a, _), (b, _)| b.line.cmp(&a.line));
    for (site, text) in written {
        lines.insert(site.line, to_block_comment(&text, &site.indent));
    }

    let mut out = lines.join("\n");
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}
