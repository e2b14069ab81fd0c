#[cfg(test)]
#[path = "chunk_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// One decoded stream frame. The backends behind the proxy disagree on where
/// the text delta lives, so every known shape is optional and [`delta`]
/// resolves them in a fixed priority order.
///
/// [`delta`]: StreamChunk::delta
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Model identifier echo, diagnostic only.
    #[serde(default)]
    pub model: Option<String>,
}

impl StreamChunk {
    /// Parses one frame. Malformed frames return `None` and are skipped by
    /// the caller; a transient bad line must never abort the stream.
    pub fn parse(frame: &str) -> Option<StreamChunk> {
        return serde_json::from_str(frame).ok();
    }

    /// First non-empty match wins: `content`, then `message.content`, then
    /// `response`, then `choices[0].delta.content`. An empty result is a
    /// valid no-op, not an error.
    pub fn delta(&self) -> String {
        if let Some(content) = &self.content {
            if !content.is_empty() {
                return content.to_string();
            }
        }

        if let Some(message) = &self.message {
            if !message.content.is_empty() {
                return message.content.to_string();
            }
        }

        if let Some(response) = &self.response {
            if !response.is_empty() {
                return response.to_string();
            }
        }

        if let Some(choice) = self.choices.first() {
            if !choice.delta.content.is_empty() {
                return choice.delta.content.to_string();
            }
        }

        return "".to_string();
    }
}
