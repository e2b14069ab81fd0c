use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::sync::mpsc;

use super::Role;
use super::StreamEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum BackendName {
    Local,
    Hosted,
}

/// One entry of the message history as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// A completion request: the model bound to the conversation plus its full
/// message history, ending with the user message being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> BackendName;

    /// Used at startup to verify the backend proxy is reachable.
    async fn health_check(&self) -> Result<()>;

    /// All models the backend currently serves.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Streams a completion, emitting [`StreamEvent`]s on `tx` in arrival
    /// order. Failures are reported as a terminal `Failed` event rather than
    /// an `Err`; the returned `Result` only covers the channel itself.
    async fn get_completion<'a>(
        &self,
        request: ChatRequest,
        tx: &'a mpsc::UnboundedSender<StreamEvent>,
    ) -> Result<()>;
}

pub type BackendBox = Box<dyn Backend>;
