#[cfg(test)]
#[path = "hosted_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;

use super::stream_completion;
use super::FallbackRequest;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatRequest;
use crate::domain::models::StreamEvent;
use crate::domain::models::WireMessage;
use crate::infrastructure::api::ApiClient;

const CHAT_PATH: &str = "/qchat-api/v1/openai/chat";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    stream: bool,
    messages: Vec<WireMessage>,
}

/// Same body without the streaming flag, for the one-shot retry.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FallbackCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
}

/// The hosted model behind the proxy's OpenAI route. A failed streaming
/// attempt triggers exactly one non-streaming request with the identical
/// model and message history before giving up.
#[derive(Default)]
pub struct Hosted {
    client: ApiClient,
}

impl Hosted {
    pub fn with_client(client: ApiClient) -> Hosted {
        return Hosted { client };
    }
}

#[async_trait]
impl Backend for Hosted {
    fn name(&self) -> BackendName {
        return BackendName::Hosted;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if !self.client.check_health().await {
            tracing::error!("QChat API is not healthy");
            bail!("QChat API is not healthy");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        return self.client.list_models().await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        request: ChatRequest,
        tx: &'a mpsc::UnboundedSender<StreamEvent>,
    ) -> Result<()> {
        let req = CompletionRequest {
            model: request.model.clone(),
            stream: true,
            messages: request.messages.clone(),
        };

        let fallback = FallbackRequest {
            path: CHAT_PATH.to_string(),
            body: serde_json::to_value(FallbackCompletionRequest {
                model: request.model,
                messages: request.messages,
            })?,
        };

        stream_completion(&self.client, CHAT_PATH, &req, Some(fallback), tx).await?;
        return Ok(());
    }
}
