use anyhow::Result;
use tokio::sync::mpsc;

use super::Hosted;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatRequest;
use crate::domain::models::Role;
use crate::domain::models::StreamEvent;
use crate::domain::models::WireMessage;
use crate::infrastructure::api::ApiClient;

fn drain(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    return events;
}

fn request() -> ChatRequest {
    return ChatRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![WireMessage {
            role: Role::User,
            content: "Say hi to the world".to_string(),
        }],
    };
}

#[test]
fn it_is_resolved_by_the_backend_manager() {
    let backend = crate::infrastructure::backends::BackendManager::get(BackendName::Hosted);
    assert_eq!(backend.name(), BackendName::Hosted);
}

#[tokio::test]
async fn it_gets_completions_from_choices_deltas() -> Result<()> {
    let body = [
        r#"{"choices":[{"delta":{"content":"Hello "}}]}"#,
        r#"{"choices":[{"delta":{"content":"World"}}]}"#,
    ]
    .join("\n");

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/qchat-api/v1/openai/chat")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": true,
            "messages": [{"role": "user", "content": "Say hi to the world"}],
        })))
        .with_status(200)
        .with_body(body)
        .create();

    let (tx, mut rx) = mpsc::unbounded_channel::<StreamEvent>();
    let backend = Hosted::with_client(ApiClient::with_base(server.url()));
    backend.get_completion(request(), &tx).await?;

    assert_eq!(
        drain(&mut rx),
        vec![
            StreamEvent::Delta {
                text: "Hello ".to_string(),
                model: None,
            },
            StreamEvent::Delta {
                text: "World".to_string(),
                model: None,
            },
            StreamEvent::Completed,
        ]
    );
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_once_with_identical_history() -> Result<()> {
    let mut server = mockito::Server::new();
    let stream_mock = server
        .mock("POST", "/qchat-api/v1/openai/chat")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": true,
            "messages": [{"role": "user", "content": "Say hi to the world"}],
        })))
        .with_status(500)
        .expect(1)
        .create();
    let fallback_mock = server
        .mock("POST", "/qchat-api/v1/openai/chat")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "Say hi to the world"}],
        })))
        .with_status(200)
        .with_body(r#"{"status":true,"data":{"content":"Hello World","model":"gpt-4o-mini"}}"#)
        .expect(1)
        .create();

    let (tx, mut rx) = mpsc::unbounded_channel::<StreamEvent>();
    let backend = Hosted::with_client(ApiClient::with_base(server.url()));
    backend.get_completion(request(), &tx).await?;

    assert_eq!(
        drain(&mut rx),
        vec![
            StreamEvent::Replace {
                text: "Hello World".to_string(),
                model: Some("gpt-4o-mini".to_string()),
            },
            StreamEvent::Completed,
        ]
    );
    stream_mock.assert();
    fallback_mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_reports_failure_when_both_attempts_fail() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/qchat-api/v1/openai/chat")
        .with_status(500)
        .expect(2)
        .create();

    let (tx, mut rx) = mpsc::unbounded_channel::<StreamEvent>();
    let backend = Hosted::with_client(ApiClient::with_base(server.url()));
    backend.get_completion(request(), &tx).await?;

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], StreamEvent::Failed(_)));
    mock.assert();

    return Ok(());
}
