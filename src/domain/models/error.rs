use thiserror::Error;

/// Failures a stream can surface to its caller. Malformed frames and
/// unrecognized chunk shapes are absorbed at the interpreter boundary and
/// never appear here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Transport rejected the connection, or the response carried a
    /// non-success status.
    #[error("could not connect to the backend: {reason}")]
    Connection { reason: String },

    /// The response body became unreadable after the connection opened.
    #[error("stream read failed: {reason}")]
    Read { reason: String },
}
