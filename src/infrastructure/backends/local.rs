#[cfg(test)]
#[path = "local_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;

use super::stream_completion;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatRequest;
use crate::domain::models::StreamEvent;
use crate::domain::models::WireMessage;
use crate::infrastructure::api::ApiClient;

const CHAT_PATH: &str = "/qchat-api/v1/ollama/chat";
const QNA_PATH: &str = "/qchat-api/v1/ollama/qna";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    stream: bool,
    messages: Vec<WireMessage>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct QnaRequest {
    model: String,
    stream: bool,
    prompt: String,
}

/// Locally hosted models behind the proxy's Ollama routes. No fallback: a
/// failed stream reports failure directly.
#[derive(Default)]
pub struct Local {
    client: ApiClient,
}

impl Local {
    pub fn with_client(client: ApiClient) -> Local {
        return Local { client };
    }

    /// Document grounded Q&A. Same streaming discipline as chat, but the
    /// wire body carries a bare prompt instead of a message history.
    pub async fn get_answer<'a>(
        &self,
        prompt: &str,
        model: &str,
        tx: &'a mpsc::UnboundedSender<StreamEvent>,
    ) -> Result<()> {
        let req = QnaRequest {
            model: model.to_string(),
            stream: true,
            prompt: prompt.to_string(),
        };

        stream_completion(&self.client, QNA_PATH, &req, None, tx).await?;
        return Ok(());
    }
}

#[async_trait]
impl Backend for Local {
    fn name(&self) -> BackendName {
        return BackendName::Local;
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
            model: request.model,
            stream: true,
            messages: request.messages,
        };

        stream_completion(&self.client, CHAT_PATH, &req, None, tx).await?;
        return Ok(());
    }
}
