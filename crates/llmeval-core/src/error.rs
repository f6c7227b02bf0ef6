//! Error taxonomy for llmeval.
//!
//! [`EvalError`] covers the harness environment (files, config) and aborts
//! the process. [`RequestError`] describes backend behaviour and is recorded
//! as data in an `.err` artifact.

use std::path::PathBuf;

/// Errors produced while talking to the chat-completion backend.
///
/// The `Display` text of this error is exactly what the driver writes into
/// the `.err` artifact for the failed combination.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("TransportError: {0}")]
    Transport(String),

    #[error("HTTPError: HTTP Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("EnvelopeError: {0}")]
    Envelope(String),
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        RequestError::Transport(err.to_string())
    }
}

/// Harness errors. Any of these makes the run unusable and is fatal.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed record at {path:?} line {line}: {source}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact not found: {0:?}")]
    MissingArtifact(PathBuf),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for llmeval operations.
pub type Result<T> = std::result::Result<T, EvalError>;
