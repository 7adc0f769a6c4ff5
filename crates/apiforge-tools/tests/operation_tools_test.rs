//! Generated API methods exposed as tools.
//!
//! Covers:
//! - Missing required parameters failing before any dispatch
//! - Multipart uploads with a null file
//! - Descriptors and wire formats for the Petstore operations
//! - Structured errors for HTTP failures
//! - OpenAPI 3.0 bounds, nullable markers and schema defaults

use apiforge_codegen::{ClientGenerator, GeneratedClient};
use apiforge_core::{GeneratorConfig, HttpVerb};
use apiforge_schema::{DocumentFormat, SchemaDocument};
use apiforge_tools::{
    HttpRequest, HttpResponse, RequestError, RequestPayload, ToolError, ToolRegistry, Transport,
    convert,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

const PETSTORE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../apiforge-schema/tests/fixtures/petstore.yaml");

/// Records every request and answers with a fixed response.
struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    response: HttpResponse,
}

impl RecordingTransport {
    fn answering(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            response: HttpResponse::new(status, body),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

fn client() -> GeneratedClient {
    let document = SchemaDocument::from_path(PETSTORE).unwrap();
    ClientGenerator::new()
        .unwrap()
        .generate(&document, &GeneratorConfig::default())
        .unwrap()
}

fn registry(transport: &Arc<RecordingTransport>) -> ToolRegistry {
    let transport: Arc<dyn Transport> = Arc::clone(transport) as Arc<dyn Transport>;
    ToolRegistry::from_client(&client(), transport)
}

#[test]
fn test_every_operation_is_registered() {
    let transport = RecordingTransport::answering(200, "{}");
    let registry = registry(&transport);
    let client = client();

    let names: Vec<&str> = registry.list_tools().iter().map(|d| d.name.as_str()).collect();
    let expected: Vec<&str> = client.method_names().collect();
    assert_eq!(names, expected);
}

#[test]
fn test_get_pet_by_id_descriptor() {
    let transport = RecordingTransport::answering(200, "{}");
    let registry = registry(&transport);
    let descriptor = registry.descriptor("get_pet_by_id").unwrap();

    assert_eq!(descriptor.argument_schema["required"], json!(["petId"]));
    assert_eq!(
        descriptor.argument_schema["properties"]["petId"]["type"],
        "integer"
    );
    assert_eq!(descriptor.output_schema, Some(json!({"type": "object"})));
    assert_eq!(descriptor.tags, ["pet"]);

    let mcp = convert::to_mcp_tool(descriptor);
    assert_eq!(mcp.name, "get_pet_by_id");
    assert!(mcp.output_schema.is_some());
}

#[tokio::test]
async fn test_missing_pet_id_never_dispatches() {
    let transport = RecordingTransport::answering(200, "{}");
    let registry = registry(&transport);

    let err = registry
        .call_tool("get_pet_by_id", json!({}))
        .await
        .unwrap_err();
    assert!(err.is_invalid_arguments());

    // A null value passes the bridge's schema only for optional fields.
    let err = registry
        .call_tool("get_pet_by_id", json!({"petId": null}))
        .await
        .unwrap_err();
    assert!(err.is_invalid_arguments());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_get_pet_by_id_dispatch() {
    let transport = RecordingTransport::answering(200, r#"{"id": 7, "name": "rex"}"#);
    let registry = registry(&transport);

    let result = registry
        .call_tool("get_pet_by_id", json!({"petId": 7}))
        .await
        .unwrap();
    assert_eq!(result["name"], "rex");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpVerb::Get);
    assert_eq!(requests[0].path, "/pet/7");
    assert_eq!(requests[0].payload, RequestPayload::None);
}

#[tokio::test]
async fn test_upload_with_null_file() {
    let transport = RecordingTransport::answering(200, r#"{"code": 200}"#);
    let registry = registry(&transport);

    registry
        .call_tool(
            "upload_file",
            json!({"petId": 3, "caption": "portrait", "file": null}),
        )
        .await
        .unwrap();

    let requests = transport.requests();
    let RequestPayload::Multipart { fields, files } = &requests[0].payload else {
        panic!("expected a multipart payload");
    };
    assert_eq!(fields.get("caption"), Some(&json!("portrait")));
    assert!(files.is_empty());
    assert!(requests[0].query.is_empty());
    assert_eq!(requests[0].content_type.as_deref(), Some("multipart/form-data"));
}

#[tokio::test]
async fn test_upload_with_file() {
    let transport = RecordingTransport::answering(200, "");
    let registry = registry(&transport);

    let result = registry
        .call_tool(
            "upload_file",
            json!({"petId": 3, "file": "binary", "additionalMetadata": "x"}),
        )
        .await
        .unwrap();
    assert_eq!(result, Value::Null);

    let requests = transport.requests();
    let RequestPayload::Multipart { files, .. } = &requests[0].payload else {
        panic!("expected a multipart payload");
    };
    assert_eq!(files.get("file"), Some(&json!("binary")));
    assert_eq!(
        requests[0].query,
        [("additionalMetadata".to_string(), json!("x"))]
    );
}

#[tokio::test]
async fn test_http_failure_is_structured() {
    let transport = RecordingTransport::answering(404, "Pet not found");
    let registry = registry(&transport);

    let err = registry
        .call_tool("get_pet_by_id", json!({"petId": 1}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ToolError::Request(RequestError::Status { status: 404, .. })
    ));

    let structured = registry
        .call_tool_structured("get_pet_by_id", json!({"petId": 1}))
        .await;
    assert_eq!(structured["error"]["kind"], "http_status");
    assert_eq!(structured["error"]["status"], 404);
    assert_eq!(structured["error"]["body"], "Pet not found");
}

#[tokio::test]
async fn test_lenient_decoding_of_list_arguments() {
    let transport = RecordingTransport::answering(200, "[]");
    let registry = registry(&transport);

    registry
        .call_tool(
            "create_users_with_list_input",
            json!({"user_list": r#"[{"username": "ann"}]"#}),
        )
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(
        requests[0].payload,
        RequestPayload::Json(json!([{"username": "ann"}]))
    );
}

const LISTING: &str = r#"
openapi: 3.0.3
info:
  title: Listing
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            minimum: 0
            exclusiveMinimum: true
            default: 20
        - name: status
          in: query
          schema:
            type: string
            nullable: true
"#;

#[tokio::test]
async fn test_openapi_30_parameters_are_registered_with_defaults() {
    let document = SchemaDocument::from_str(LISTING, DocumentFormat::Yaml).unwrap();
    let client = ClientGenerator::new()
        .unwrap()
        .generate(&document, &GeneratorConfig::default())
        .unwrap();
    let transport = RecordingTransport::answering(200, "[]");
    let registry = ToolRegistry::from_client(&client, Arc::clone(&transport) as Arc<dyn Transport>);

    let descriptor = registry.descriptor("list_pets").unwrap();
    let limit = &descriptor.argument_schema["properties"]["limit"];
    assert_eq!(limit["default"], 20);
    assert_eq!(limit["exclusiveMinimum"], 0);
    assert_eq!(descriptor.argument_schema["required"], json!([]));

    registry.call_tool("list_pets", json!({})).await.unwrap();
    registry
        .call_tool("list_pets", json!({"limit": 5, "status": null}))
        .await
        .unwrap();
    let err = registry
        .call_tool("list_pets", json!({"limit": 0}))
        .await
        .unwrap_err();
    assert!(err.is_invalid_arguments());

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query, [("limit".to_string(), json!(20))]);
    assert_eq!(requests[1].query, [("limit".to_string(), json!(5))]);
}
