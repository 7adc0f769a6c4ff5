//! Documentation generation with scripted writers.
//!
//! Covers:
//! - Independent per-function failures
//! - Retries of transient errors
//! - In-place rewriting of a file
//! - Inserted blocks parsing back
//! - Callbacks inside bodies never treated as declarations

use apiforge_docgen::{
    DocWriter, DocgenError, DocgenOptions, FunctionSite, Result, document_file, find_undocumented,
    generate_docs,
};
use apiforge_docs::{parse_doc, strip_block_comment};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SOURCE: &str = r"export class Shop {
  list(limit: number): string[] {
    return [];
  }

  buy(item: string): boolean {
    return true;
  }

  refund(item: string): void {
  }
}
";

/// Fails a scripted number of times per function, then succeeds.
struct ScriptedWriter {
    failures: Mutex<HashMap<String, usize>>,
    permanent: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedWriter {
    fn new() -> Self {
        Self {
            failures: Mutex::new(HashMap::new()),
            permanent: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(mut self, name: &str, times: usize) -> Self {
        self.failures.get_mut().unwrap().insert(name.to_string(), times);
        self
    }

    fn rejecting(mut self, name: &str) -> Self {
        self.permanent = Some(name.to_string());
        self
    }
}

#[async_trait]
impl DocWriter for ScriptedWriter {
    async fn write_doc(&self, site: &FunctionSite) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.permanent.as_deref() == Some(site.name.as_str()) {
            return Err(DocgenError::Api {
                status: 400,
                message: "rejected".to_string(),
            });
        }
        {
            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&site.name)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(DocgenError::Transport("connection reset".to_string()));
            }
        }
        Ok(format!(
            "Handles {}.\n\nReturns:\n    any: Whatever {} produces.",
            site.name, site.name
        ))
    }
}

fn options(max_attempts: usize) -> DocgenOptions {
    DocgenOptions {
        max_concurrency: 2,
        max_attempts,
        retry_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_every_function_documented() {
    let report = generate_docs(SOURCE, Arc::new(ScriptedWriter::new()), &options(1)).await.unwrap();

    assert_eq!(report.documented, ["list", "buy", "refund"]);
    assert!(report.failed.is_empty());
    assert!(find_undocumented(&report.source).unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failure_does_not_block_the_others() {
    let writer = ScriptedWriter::new().rejecting("buy");
    let report = generate_docs(SOURCE, Arc::new(writer), &options(3)).await.unwrap();

    assert_eq!(report.documented, ["list", "refund"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "buy");

    let remaining: Vec<String> = find_undocumented(&report.source)
        .unwrap()
        .into_iter()
        .map(|site| site.name)
        .collect();
    assert_eq!(remaining, ["buy"]);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let writer = Arc::new(ScriptedWriter::new().failing("list", 2));
    let report = generate_docs(SOURCE, Arc::clone(&writer) as Arc<dyn DocWriter>, &options(3)).await.unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(writer.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let writer = ScriptedWriter::new().failing("refund", 10);
    let report = generate_docs(SOURCE, Arc::new(writer), &options(2)).await.unwrap();

    let (name, err) = &report.failed[0];
    assert_eq!(name, "refund");
    assert!(matches!(err, DocgenError::Exhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn test_inserted_blocks_parse_back() {
    let report = generate_docs(SOURCE, Arc::new(ScriptedWriter::new()), &options(1)).await.unwrap();

    let lines: Vec<&str> = report.source.lines().collect();
    let start = lines.iter().position(|line| line.trim() == "/**").unwrap();
    let end = lines.iter().position(|line| line.trim() == "*/").unwrap();
    let block = lines[start..=end].join("\n");

    let doc = parse_doc(&strip_block_comment(&block));
    assert_eq!(doc.summary, "Handles list.");
    assert_eq!(doc.returns, "any: Whatever list produces.");
    assert_eq!(lines[start], "  /**");
}

#[tokio::test]
async fn test_callback_bodies_are_left_alone() {
    let source = "export function schedule(jobs: Job[]): void {\n  jobs.forEach((job) => {\n    setTimeout(() => {\n      job.run();\n    }, job.delay);\n  });\n}\n";
    let writer = Arc::new(ScriptedWriter::new());
    let report = generate_docs(source, Arc::clone(&writer) as Arc<dyn DocWriter>, &options(1))
        .await
        .unwrap();

    assert_eq!(report.documented, ["schedule"]);
    assert_eq!(writer.calls.load(Ordering::SeqCst), 1);
    assert!(report.source.starts_with("/**\n * Handles schedule."));
    assert!(report.source.ends_with("  jobs.forEach((job) => {\n    setTimeout(() => {\n      job.run();\n    }, job.delay);\n  });\n}\n"));
}

#[tokio::test]
async fn test_document_file_rewrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.ts");
    std::fs::write(&path, SOURCE).unwrap();

    let report = document_file(&path, Arc::new(ScriptedWriter::new()), &options(1))
        .await
        .unwrap();
    assert!(report.changed());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), report.source);

    // Nothing left to document: the file is untouched.
    let again = document_file(&path, Arc::new(ScriptedWriter::new()), &options(1))
        .await
        .unwrap();
    assert!(!again.changed());
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = document_file(
        &dir.path().join("absent.ts"),
        Arc::new(ScriptedWriter::new()),
        &options(1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DocgenError::Io { .. }));
}
