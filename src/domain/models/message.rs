#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;

use super::Role;

/// Prefix for failures rendered into the transcript. The conversation is the
/// single error reporting channel, so stream failures become assistant
/// message content rather than raised errors.
pub const ERROR_MARKER: &str = "❌ ";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
    Normal,
    Error,
}

#[derive(Clone, Debug)]
pub struct Message {
    /// Assigned by the owning conversation on append, monotone within it.
    /// Never changes afterwards.
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
    pub model: Option<String>,
    mtype: MessageType,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            id: 0,
            role,
            content: content.to_string(),
            timestamp: Local::now(),
            model: None,
            mtype: MessageType::Normal,
        };
    }

    pub fn with_model(mut self, model: &str) -> Message {
        if !model.is_empty() {
            self.model = Some(model.to_string());
        }
        return self;
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    pub fn append(&mut self, text: &str) {
        self.content += text;
    }

    /// Replaces the accumulated content with a user visible error string.
    pub fn set_error(&mut self, reason: &str) {
        self.content = format!("{ERROR_MARKER}{reason}");
        self.mtype = MessageType::Error;
    }
}
