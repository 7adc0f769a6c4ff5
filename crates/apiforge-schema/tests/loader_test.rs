//! Integration tests for document loading.

use apiforge_schema::{CIRCULAR_MARKER, SchemaDocument, find_unresolved};
use std::io::Write;

const PETSTORE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/petstore.yaml");

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_petstore_loads_without_refs() {
    let doc = SchemaDocument::from_path(PETSTORE).unwrap();

    assert_eq!(doc.title(), "Swagger Petstore");
    assert_eq!(doc.base_url(), "https://petstore3.swagger.io/api/v3");
    assert!(!serde_json::to_string(doc.root()).unwrap().contains("$ref"));
    assert!(find_unresolved(doc.root()).is_none());
}

#[test]
fn test_petstore_refs_and_all_of_are_flattened() {
    let doc = SchemaDocument::from_path(PETSTORE).unwrap();
    let root = doc.root();

    let pet = root
        .pointer("/paths/~1pet/put/requestBody/content/application~1json/schema")
        .unwrap();
    assert_eq!(pet["properties"]["category"]["properties"]["name"]["type"], "string");

    let order = root
        .pointer("/paths/~1store~1order~1{orderId}/get/responses/200/content/application~1json/schema")
        .unwrap();
    assert_eq!(order["type"], "object");
    assert_eq!(order["properties"].as_object().unwrap().len(), 3);
}

#[test]
fn test_extension_dispatch() {
    let json = write_temp(".json", r#"{"info": {"title": "J"}, "paths": {}}"#);
    assert_eq!(SchemaDocument::from_path(json.path()).unwrap().title(), "J");

    let yml = write_temp(".yml", "info:\n  title: Y\npaths: {}\n");
    assert_eq!(SchemaDocument::from_path(yml.path()).unwrap().title(), "Y");

    let sniffed_json = write_temp(".spec", r#"  {"info": {"title": "S"}}"#);
    assert_eq!(SchemaDocument::from_path(sniffed_json.path()).unwrap().title(), "S");

    let sniffed_yaml = write_temp("", "info:\n  title: N\n");
    assert_eq!(SchemaDocument::from_path(sniffed_yaml.path()).unwrap().title(), "N");
}

#[test]
fn test_yaml_in_json_file_is_parse_error() {
    let file = write_temp(".json", "info:\n  title: T\n");
    assert!(SchemaDocument::from_path(file.path()).unwrap_err().is_parse_error());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SchemaDocument::from_path("/nonexistent/spec.yaml").unwrap_err();
    assert!(matches!(err, apiforge_core::Error::Io { .. }));
}

#[test]
fn test_self_referencing_schema_terminates() {
    let file = write_temp(
        ".yaml",
        "info:\n  title: Tree\npaths:\n  /nodes:\n    get:\n      responses:\n        '200':\n          content:\n            application/json:\n              schema:\n                $ref: '#/components/schemas/Node'\ncomponents:\n  schemas:\n    Node:\n      type: object\n      properties:\n        children:\n          type: array\n          items:\n            $ref: '#/components/schemas/Node'\n",
    );

    let doc = SchemaDocument::from_path(file.path()).unwrap();
    let items = doc
        .root()
        .pointer("/paths/~1nodes/get/responses/200/content/application~1json/schema/properties/children/items")
        .unwrap();
    assert_eq!(items[CIRCULAR_MARKER], "#/components/schemas/Node");
}
