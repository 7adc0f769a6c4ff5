//! Benchmarks for client generation.
//!
//! Measures IR construction and rendering for synthetic documents with
//! growing operation counts.
//!
//! Run with: cargo bench --package apiforge-codegen

use apiforge_codegen::ClientGenerator;
use apiforge_core::GeneratorConfig;
use apiforge_schema::SchemaDocument;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use std::hint::black_box;

/// Builds a document with `count` resources, each with a list, a get and a
/// multipart upload operation.
fn create_document(count: usize) -> SchemaDocument {
    let mut paths = Map::new();
    for index in 0..count {
        paths.insert(
            format!("/api/v1/resource{index}"),
            json!({
                "get": {
                    "operationId": format!("listResource{index}"),
                    "summary": format!("Lists resource {index}."),
                    "parameters": [
                        {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                        {"name": "tags", "in": "query", "schema": {"type": "array", "items": {"type": "string"}}}
                    ],
                    "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {"type": "array", "items": {"$ref": "#/components/schemas/Item"}}}}}}
                }
            }),
        );
        paths.insert(
            format!("/api/v1/resource{index}/{{id}}"),
            json!({
                "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "integer"}}],
                "get": {
                    "operationId": format!("getResource{index}"),
                    "parameters": [{"name": "id", "in": "query", "schema": {"type": "string"}}],
                    "responses": {"200": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Item"}}}}}
                },
                "post": {
                    "operationId": format!("uploadResource{index}"),
                    "requestBody": {"content": {"multipart/form-data": {"schema": {
                        "type": "object",
                        "properties": {
                            "caption": {"type": "string"},
                            "file": {"type": "string", "format": "binary"}
                        }
                    }}}}
                }
            }),
        );
    }

    let document = json!({
        "openapi": "3.0.3",
        "info": {"title": "Bench API"},
        "paths": Value::Object(paths),
        "components": {"schemas": {"Item": {
            "type": "object",
            "required": ["id"],
            "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
        }}}
    });
    SchemaDocument::from_value(&document).unwrap()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let generator = ClientGenerator::new().unwrap();
    let config = GeneratorConfig::default();

    for count in [1, 10, 50, 100] {
        let document = create_document(count);
        group.throughput(Throughput::Elements((count * 3) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &document, |b, document| {
            b.iter(|| generator.generate(black_box(document), &config).unwrap());
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let generator = ClientGenerator::new().unwrap();

    for count in [10, 100] {
        let client = generator
            .generate(&create_document(count), &GeneratorConfig::default())
            .unwrap();
        group.bench_with_input(BenchmarkId::new("single", count), &client, |b, client| {
            b.iter(|| generator.render(black_box(client)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("split", count), &client, |b, client| {
            b.iter(|| generator.render_split(black_box(client), "bench").unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_render);
criterion_main!(benches);
