#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

use anyhow::Result;
use futures::stream::StreamExt;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::models::StreamChunk;
use crate::domain::models::StreamError;
use crate::domain::models::StreamEvent;
use crate::domain::services::FrameDecoder;
use crate::infrastructure::api::ApiClient;

/// Per invocation state of one streaming request. Every send starts a fresh
/// pass through `Connecting -> Streaming -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Failed,
}

/// One-shot non-streaming retry, configured for the hosted backend only.
pub struct FallbackRequest {
    pub path: String,
    pub body: serde_json::Value,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FallbackData {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FallbackResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    data: FallbackData,
}

/// Drives one streaming completion end to end: opens the transport, pumps
/// the frame decoder, interprets every frame, and emits deltas on `tx` in
/// strict arrival order. Failures turn into one fallback attempt when
/// configured, and a terminal `Failed` event otherwise; they are never
/// returned as `Err`. The returned `Result` only covers sending on `tx`.
pub async fn stream_completion<B: Serialize + Sync + ?Sized>(
    client: &ApiClient,
    path: &str,
    body: &B,
    fallback: Option<FallbackRequest>,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<StreamState> {
    let mut state = StreamState::Idle;
    tracing::debug!(?state, path, "completion requested");

    state = StreamState::Connecting;
    tracing::debug!(?state, path, "opening completion stream");

    let res = match client.post_stream(path, body).await {
        Ok(res) => res,
        Err(err) => return recover(client, fallback, err, tx).await,
    };

    state = StreamState::Streaming;
    tracing::debug!(?state, path, "response body attached");

    let mut decoder = FrameDecoder::default();
    let mut stream = res.bytes_stream();

    while let Some(read) = stream.next().await {
        match read {
            Ok(bytes) => {
                for frame in decoder.feed(&bytes) {
                    deliver_frame(&frame, tx)?;
                }
            }
            Err(err) => {
                let err = StreamError::Read {
                    reason: err.to_string(),
                };
                return recover(client, fallback, err, tx).await;
            }
        }
    }

    if let Some(frame) = decoder.finish() {
        deliver_frame(&frame, tx)?;
    }

    tx.send(StreamEvent::Completed)?;
    return Ok(StreamState::Completed);
}

fn deliver_frame(frame: &str, tx: &mpsc::UnboundedSender<StreamEvent>) -> Result<()> {
    if frame.trim().is_empty() {
        return Ok(());
    }

    let chunk = match StreamChunk::parse(frame) {
        Some(chunk) => chunk,
        None => {
            // Transient malformed lines are tolerated, the stream goes on.
            tracing::warn!(frame, "skipping malformed stream frame");
            return Ok(());
        }
    };
    tracing::debug!(body = ?chunk, "completion chunk");

    let delta = chunk.delta();
    if delta.is_empty() {
        return Ok(());
    }

    tx.send(StreamEvent::Delta {
        text: delta,
        model: chunk.model,
    })?;

    return Ok(());
}

async fn recover(
    client: &ApiClient,
    fallback: Option<FallbackRequest>,
    err: StreamError,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<StreamState> {
    tracing::error!(error = %err, "completion stream failed");

    let fallback = match fallback {
        Some(fallback) => fallback,
        None => {
            tx.send(StreamEvent::Failed(err))?;
            return Ok(StreamState::Failed);
        }
    };

    tracing::warn!(path = fallback.path.as_str(), "retrying without streaming");
    let res = client
        .post_json::<serde_json::Value, FallbackResponse>(&fallback.path, &fallback.body)
        .await;

    match res {
        Ok(envelope) => {
            let FallbackData {
                content,
                message,
                model,
            } = envelope.data;

            if envelope.status {
                if let Some(text) = content.or(message) {
                    // The stream may have emitted partial deltas before it
                    // failed; the retry answer supersedes them wholesale.
                    tx.send(StreamEvent::Replace { text, model })?;
                    tx.send(StreamEvent::Completed)?;
                    return Ok(StreamState::Completed);
                }
            }

            tracing::error!("fallback response had an unrecognized format");
            tx.send(StreamEvent::Failed(err))?;
            return Ok(StreamState::Failed);
        }
        Err(fallback_err) => {
            tracing::error!(error = %fallback_err, "fallback request failed");
            tx.send(StreamEvent::Failed(err))?;
            return Ok(StreamState::Failed);
        }
    }
}
