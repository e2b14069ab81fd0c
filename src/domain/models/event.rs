use super::StreamError;

/// Vocabulary between a streaming backend and the surface that owns the
/// conversation state. Events for one stream arrive in strict FIFO order;
/// after `Completed` or `Failed` no further events are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta {
        text: String,
        /// Model identifier echoed by the backend, when present.
        model: Option<String>,
    },
    /// Whole answer delivered by a non-streaming retry. Overwrites any
    /// partial content the failed stream already produced for the message.
    Replace {
        text: String,
        model: Option<String>,
    },
    Completed,
    /// Terminal failure after any fallback attempt. Surfaces render this as
    /// message content, never as a raised error.
    Failed(StreamError),
}
