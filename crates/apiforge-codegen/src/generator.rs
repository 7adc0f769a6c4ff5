//! Client generation.
//!
//! [`ClientGenerator`] drives the pipeline: operations are extracted and
//! rendered into a [`GeneratedClient`], which is then written out either as
//! one TypeScript file or split into topic segments.
//!
//! # Examples
//!
//! ```no_run
//! use apiforge_codegen::ClientGenerator;
//! use apiforge_core::GeneratorConfig;
//! use apiforge_schema::SchemaDocument;
//!
//! let document = SchemaDocument::from_path("petstore.yaml")?;
//! let generator = ClientGenerator::new()?;
//! let client = generator.generate(&document, &GeneratorConfig::default())?;
//! println!("{}", generator.render(&client)?);
//! # Ok::<(), apiforge_core::Error>(())
//! ```

use crate::extractor::{Operation, extract, operations};
use crate::ir::{GeneratedClient, GeneratedMethod};
use crate::naming::NameAllocator;
use crate::render::build_method;
use crate::segments::{Segment, partition};
use crate::template_engine::TemplateEngine;
use crate::types::{GeneratedCode, GeneratedFile};
use crate::typescript::{string_literal, to_pascal_case};
use apiforge_core::{Error, GeneratorConfig, HttpVerb, Result};
use apiforge_docs::{render_doc, to_block_comment};
use apiforge_schema::SchemaDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extension of the IR file written beside a generated client.
pub const IR_EXTENSION: &str = "apiforge.json";

/// Transport verbs every client class exposes.
const TRANSPORT_VERBS: [HttpVerb; 8] = [
    HttpVerb::Get,
    HttpVerb::Post,
    HttpVerb::Put,
    HttpVerb::Patch,
    HttpVerb::Delete,
    HttpVerb::Head,
    HttpVerb::Options,
    HttpVerb::Trace,
];

#[derive(Serialize)]
struct VerbContext {
    name: &'static str,
    dispatch: String,
}

#[derive(Serialize)]
struct MethodContext {
    name: String,
    name_literal: String,
    summary_literal: String,
    tags_literal: String,
    doc_comment: String,
    signature: String,
    return_type: String,
    body: Vec<String>,
}

#[derive(Serialize)]
struct SegmentRef {
    group_key: String,
    class_name: String,
    field: String,
}

#[derive(Serialize)]
struct ClientContext {
    title: String,
    class_name: String,
    base_url: String,
    split: bool,
    segments: Vec<SegmentRef>,
    verbs: Vec<VerbContext>,
    methods: Vec<MethodContext>,
}

#[derive(Serialize)]
struct SegmentContext {
    title: String,
    group_key: String,
    class_name: String,
    root_class: String,
    root_stem: String,
    verbs: Vec<VerbContext>,
    methods: Vec<MethodContext>,
}

#[derive(Serialize)]
struct RuntimeContext<'a> {
    title: &'a str,
}

/// Compiles schema documents into TypeScript clients.
#[derive(Debug)]
pub struct ClientGenerator {
    engine: TemplateEngine<'static>,
}

impl ClientGenerator {
    /// Creates a generator with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if a built-in template fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
        })
    }

    /// Builds the client IR for a document.
    ///
    /// Operations whose references cannot be resolved, or whose names cannot
    /// be made unique, are skipped with a warning. Output is deterministic:
    /// methods follow document order.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure that is not scoped to one operation.
    pub fn generate(
        &self,
        document: &SchemaDocument,
        config: &GeneratorConfig,
    ) -> Result<GeneratedClient> {
        let operations = operations(document);
        tracing::info!(
            "Generating client for '{}' ({} operations)",
            document.title(),
            operations.len()
        );

        let built = build_all(&operations);

        let mut names = NameAllocator::for_methods();
        let mut methods = Vec::with_capacity(built.len());
        for (operation, result) in operations.iter().zip(built) {
            let claimed = result.and_then(|mut method| {
                method.name = names.claim_with_tiebreak(&method.name)?;
                Ok(method)
            });
            match claimed {
                Ok(method) => methods.push(method),
                Err(e) if e.is_operation_scoped() => {
                    tracing::warn!("Skipping {}: {e}", operation.label());
                }
                Err(e) => return Err(e),
            }
        }

        let client = GeneratedClient {
            class_name: config
                .class_name
                .clone()
                .unwrap_or_else(|| default_class_name(document.title())),
            title: document.title().to_string(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| document.base_url().to_string()),
            methods,
        };

        tracing::debug!(
            class = %client.class_name,
            methods = client.methods.len(),
            "Built client"
        );
        Ok(client)
    }

    /// Renders the client as one self-contained TypeScript file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if rendering fails.
    pub fn render(&self, client: &GeneratedClient) -> Result<String> {
        let runtime = self.render_runtime(client)?;
        let context = ClientContext {
            title: client.title.clone(),
            class_name: client.class_name.clone(),
            base_url: string_literal(&client.base_url),
            split: false,
            segments: Vec::new(),
            verbs: verb_contexts(false),
            methods: client.methods.iter().map(method_context).collect(),
        };
        let class = self.engine.render("client", &context)?;
        Ok(format!("{runtime}{class}"))
    }

    /// Renders the client split into segments.
    ///
    /// Produces `<stem>.ts` (root class), `segments/<key>.ts` per segment and
    /// the shared `runtime.ts`.
    ///
    /// # Errors
    ///
    /// Returns an error if partitioning or rendering fails.
    pub fn render_split(&self, client: &GeneratedClient, stem: &str) -> Result<GeneratedCode> {
        let partition = partition(client)?;
        let mut code = GeneratedCode::new();

        let root = ClientContext {
            title: client.title.clone(),
            class_name: client.class_name.clone(),
            base_url: string_literal(&client.base_url),
            split: true,
            segments: partition
                .segments
                .iter()
                .map(|segment| SegmentRef {
                    group_key: segment.group_key.clone(),
                    class_name: segment.class_name.clone(),
                    field: segment.field.clone(),
                })
                .collect(),
            verbs: verb_contexts(false),
            methods: partition.root.iter().map(method_context).collect(),
        };
        code.add_file(GeneratedFile::new(
            format!("{stem}.ts"),
            self.engine.render("client", &root)?,
        ));

        for segment in &partition.segments {
            code.add_file(GeneratedFile::new(
                format!("segments/{}.ts", segment.group_key),
                self.render_segment(client, segment, stem)?,
            ));
        }

        code.add_file(GeneratedFile::new(
            "runtime.ts",
            self.render_runtime(client)?,
        ));

        tracing::info!(
            "Split {} into {} segments ({} root methods)",
            client.class_name,
            partition.segments.len(),
            partition.root.len()
        );
        Ok(code)
    }

    /// Produces every output file for a client.
    ///
    /// With `emit_ir`, the serialized IR is added as `<stem>.apiforge.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or serialization fails.
    pub fn files(
        &self,
        client: &GeneratedClient,
        stem: &str,
        split: bool,
        emit_ir: bool,
    ) -> Result<GeneratedCode> {
        let mut code = if split {
            self.render_split(client, stem)?
        } else {
            let mut code = GeneratedCode::new();
            code.add_file(GeneratedFile::new(format!("{stem}.ts"), self.render(client)?));
            code
        };

        if emit_ir {
            code.add_file(GeneratedFile::new(
                format!("{stem}.{IR_EXTENSION}"),
                to_ir_json(client)?,
            ));
        }
        Ok(code)
    }

    fn render_runtime(&self, client: &GeneratedClient) -> Result<String> {
        self.engine.render(
            "runtime",
            &RuntimeContext {
                title: &client.title,
            },
        )
    }

    fn render_segment(
        &self,
        client: &GeneratedClient,
        segment: &Segment,
        stem: &str,
    ) -> Result<String> {
        let context = SegmentContext {
            title: client.title.clone(),
            group_key: segment.group_key.clone(),
            class_name: segment.class_name.clone(),
            root_class: client.class_name.clone(),
            root_stem: stem.to_string(),
            verbs: verb_contexts(true),
            methods: segment.methods.iter().map(method_context).collect(),
        };
        self.engine.render("segment", &context)
    }
}

#[cfg(not(feature = "parallel"))]
fn build_all(operations: &[Operation<'_>]) -> Vec<Result<GeneratedMethod>> {
    operations.iter().map(build_one).collect()
}

#[cfg(feature = "parallel")]
fn build_all(operations: &[Operation<'_>]) -> Vec<Result<GeneratedMethod>> {
    use rayon::prelude::*;

    operations.par_iter().map(build_one).collect()
}

fn build_one(operation: &Operation<'_>) -> Result<GeneratedMethod> {
    let extracted = extract(operation)?;
    build_method(&extracted)
}

/// Derives the class name from a document title: PascalCase plus `Client`.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::generator::default_class_name;
///
/// assert_eq!(default_class_name("Swagger Petstore"), "SwaggerPetstoreClient");
/// assert_eq!(default_class_name("3D Printing"), "Api3DPrintingClient");
/// ```
#[must_use]
pub fn default_class_name(title: &str) -> String {
    let base = to_pascal_case(title);
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Api{base}Client")
    } else {
        format!("{base}Client")
    }
}

/// Serializes a client IR to pretty JSON.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if serialization fails.
pub fn to_ir_json(client: &GeneratedClient) -> Result<String> {
    serde_json::to_string_pretty(client)
        .map(|json| json + "\n")
        .map_err(|e| Error::SerializationError {
            message: "failed to serialize client IR".to_string(),
            source: Some(e),
        })
}

/// Returns the IR file path for a generated client source file.
///
/// # Examples
///
/// ```
/// use apiforge_codegen::generator::ir_path;
/// use std::path::Path;
///
/// assert_eq!(ir_path(Path::new("out/petstore.ts")), Path::new("out/petstore.apiforge.json"));
/// ```
#[must_use]
pub fn ir_path(source: &Path) -> PathBuf {
    source.with_extension(IR_EXTENSION)
}

/// Loads a client IR written by [`ClientGenerator::files`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::SerializationError`] if it is not a valid IR.
pub fn load_ir(path: &Path) -> Result<GeneratedClient> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| Error::SerializationError {
        message: format!("invalid client IR in {}", path.display()),
        source: Some(e),
    })
}

fn verb_contexts(forward: bool) -> Vec<VerbContext> {
    TRANSPORT_VERBS
        .iter()
        .map(|verb| VerbContext {
            name: verb.as_str(),
            dispatch: if forward {
                format!("this.client._{}(path, options)", verb.as_str())
            } else {
                format!(
                    "sendRequest(this.baseUrl, this.headers, \"{}\", path, options)",
                    verb.as_upper()
                )
            },
        })
        .collect()
}

fn method_context(method: &GeneratedMethod) -> MethodContext {
    let summary = method
        .doc
        .summary
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    MethodContext {
        name: method.name.clone(),
        name_literal: string_literal(&method.name),
        summary_literal: string_literal(&summary),
        tags_literal: serde_json::Value::from(method.doc.tags.clone()).to_string(),
        doc_comment: to_block_comment(&render_doc(&method.doc), "  "),
        signature: method.signature.clone(),
        return_type: method.return_type.clone(),
        body: method.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiforge_schema::DocumentFormat;

    const SPEC: &str = r#"{
        "openapi": "3.0.0",
        "info": {"title": "Tiny API"},
        "servers": [{"url": "https://tiny.example/v1"}],
        "paths": {
            "/items/{id}": {
                "get": {
                    "operationId": "getItem",
                    "parameters": [{"name": "id", "in": "path", "schema": {"type": "integer"}}]
                }
            },
            "/broken": {
                "get": {"operationId": "broken", "parameters": [{"$ref": "other.yaml#/p"}]}
            },
            "/items": {
                "get": {"operationId": "get_item"}
            }
        }
    }"#;

    fn document() -> SchemaDocument {
        SchemaDocument::from_str(SPEC, DocumentFormat::Json).unwrap()
    }

    #[test]
    fn test_generate_skips_unresolvable_operations() {
        let generator = ClientGenerator::new().unwrap();
        let client = generator.generate(&document(), &GeneratorConfig::default()).unwrap();

        assert_eq!(client.class_name, "TinyAPIClient");
        assert_eq!(client.base_url, "https://tiny.example/v1");
        let names: Vec<&str> = client.method_names().collect();
        assert_eq!(names, ["get_item", "get_item_2"]);
    }

    #[test]
    fn test_config_overrides_class_and_base_url() {
        let config = GeneratorConfig::builder()
            .class_name("Tiny")
            .base_url("http://localhost:8080")
            .build();
        let generator = ClientGenerator::new().unwrap();
        let client = generator.generate(&document(), &config).unwrap();
        assert_eq!(client.class_name, "Tiny");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_render_contains_runtime_and_class() {
        let generator = ClientGenerator::new().unwrap();
        let client = generator.generate(&document(), &GeneratorConfig::default()).unwrap();
        let source = generator.render(&client).unwrap();

        assert!(source.contains("export class MissingParameterError extends Error"));
        assert!(source.contains("export class TinyAPIClient {"));
        assert!(source.contains("readonly baseUrl: string = \"https://tiny.example/v1\","));
        assert!(source.contains("async get_item(id: number): Promise<unknown> {"));
        assert!(source.contains("async _trace(path: string, options: RequestOptions = {}): Promise<Response> {"));
        assert!(source.contains("{ name: \"get_item_2\", summary: \"GET /items\", tags: [], call: this.get_item_2.bind(this) },"));
        assert!(!source.contains("@path"));
    }

    #[test]
    fn test_files_include_ir_sidecar() {
        let generator = ClientGenerator::new().unwrap();
        let client = generator.generate(&document(), &GeneratorConfig::default()).unwrap();

        let code = generator.files(&client, "tiny", false, true).unwrap();
        assert_eq!(code.file_count(), 2);
        let ir = code.file("tiny.apiforge.json").unwrap();
        let restored: GeneratedClient = serde_json::from_str(ir.content()).unwrap();
        assert_eq!(restored, client);

        let code = generator.files(&client, "tiny", false, false).unwrap();
        assert_eq!(code.file_count(), 1);
    }

    #[test]
    fn test_load_ir_reports_invalid_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.apiforge.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(load_ir(&path), Err(Error::SerializationError { .. })));
        assert!(matches!(load_ir(&dir.path().join("missing.json")), Err(Error::Io { .. })));
    }
}
