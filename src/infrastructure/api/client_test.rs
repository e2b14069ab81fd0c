use anyhow::Result;

use super::ApiClient;
use super::FileDocument;

impl ApiClient {
    pub(crate) fn with_base(base_url: String) -> ApiClient {
        return ApiClient {
            base_url,
            api_key: "test-key".to_string(),
            auth_token: None,
            health_timeout: "200".to_string(),
        };
    }
}

#[tokio::test]
async fn it_attaches_credential_headers() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/qchat-api/v1/health")
        .match_header("x-api-key", "test-key")
        .match_header("authorization", "Bearer token-123")
        .with_status(200)
        .with_body(r#"{"status":true}"#)
        .create();

    let mut client = ApiClient::with_base(server.url());
    client.set_auth_token("token-123");

    assert!(client.check_health().await);
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_health_checks_successfully() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/qchat-api/v1/health")
        .with_status(200)
        .with_body(r#"{"status":true}"#)
        .create();

    let client = ApiClient::with_base(server.url());
    assert!(client.check_health().await);
    mock.assert();
}

#[tokio::test]
async fn it_maps_false_status_to_unhealthy() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/qchat-api/v1/health")
        .with_status(200)
        .with_body(r#"{"status":false}"#)
        .create();

    let client = ApiClient::with_base(server.url());
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn it_maps_malformed_health_bodies_to_unhealthy() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/qchat-api/v1/health")
        .with_status(200)
        .with_body("not json")
        .create();

    let client = ApiClient::with_base(server.url());
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn it_maps_error_statuses_to_unhealthy() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/qchat-api/v1/health")
        .with_status(503)
        .create();

    let client = ApiClient::with_base(server.url());
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn it_lists_models_sorted() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/qchat-api/v1/ollama/models")
        .with_status(200)
        .with_body(
            r#"{"status":true,"data":{"models":[{"name":"mistral:7b"},{"model":"llama3.2:1b"}]}}"#,
        )
        .create();

    let client = ApiClient::with_base(server.url());
    let models = client.list_models().await?;

    assert_eq!(
        models,
        vec!["llama3.2:1b".to_string(), "mistral:7b".to_string()]
    );
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_fails_model_listing_on_rejected_status() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/qchat-api/v1/ollama/models")
        .with_status(200)
        .with_body(r#"{"status":false,"data":{"models":[]}}"#)
        .create();

    let client = ApiClient::with_base(server.url());
    assert!(client.list_models().await.is_err());
}

#[tokio::test]
async fn it_lists_files() -> Result<()> {
    let body = r#"{
        "status": true,
        "data": {
            "pdfs": [{
                "id": "doc-1",
                "originalName": "handbook.pdf",
                "filename": "doc-1.pdf",
                "size": 1024,
                "uploadDate": "2024-01-01T00:00:00Z",
                "path": "/uploads/doc-1.pdf"
            }]
        }
    }"#;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/qchat-api/v1/files")
        .with_status(200)
        .with_body(body)
        .create();

    let client = ApiClient::with_base(server.url());
    let files = client.list_files().await?;

    assert_eq!(
        files,
        vec![FileDocument {
            id: "doc-1".to_string(),
            original_name: "handbook.pdf".to_string(),
            filename: "doc-1.pdf".to_string(),
            size: 1024,
            upload_date: "2024-01-01T00:00:00Z".to_string(),
            path: "/uploads/doc-1.pdf".to_string(),
        }]
    );
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_deletes_files() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("DELETE", "/qchat-api/v1/files/doc-1")
        .with_status(200)
        .with_body(r#"{"status":true}"#)
        .create();

    let client = ApiClient::with_base(server.url());
    assert!(client.delete_file("doc-1").await?);
    mock.assert();

    return Ok(());
}
