//! Failures talking to a database worker.

use std::io;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("could not start worker: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("could not send request to worker: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("could not read from worker: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("request could not be encoded: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("worker reply could not be decoded: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// No reply within the configured request timeout.
    #[error("{method} got no reply within {secs}s")]
    Timeout { method: String, secs: u64 },

    /// The worker died, taking its database with it.
    #[error("worker exited before replying")]
    WorkerExited,

    #[error("reply channel dropped")]
    ChannelClosed,

    /// `CONNECTION_FAILED`: the worker could not bring up or reach its database.
    #[error("worker database unavailable: {0}")]
    ConnectionFailed(String),

    /// `SQL_ERROR`: PostgreSQL rejected the statement.
    #[error("statement failed: {0}")]
    Sql(String),

    /// `INVALID_REQUEST`
    #[error("worker rejected request: {0}")]
    InvalidRequest(String),

    /// `METHOD_NOT_FOUND`
    #[error("worker does not support {0}")]
    MethodNotFound(String),

    /// Any error code not listed above.
    #[error("worker error {code}: {message}")]
    Remote { code: String, message: String },
}

impl WorkerError {
    /// Map an error code from a failed reply to its variant.
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "CONNECTION_FAILED" => Self::ConnectionFailed(message),
            "SQL_ERROR" => Self::Sql(message),
            "INVALID_REQUEST" => Self::InvalidRequest(message),
            "METHOD_NOT_FOUND" => Self::MethodNotFound(message),
            "WORKER_EXITED" => Self::WorkerExited,
            _ => Self::Remote {
                code: code.to_string(),
                message,
            },
        }
    }

    pub fn is_worker_exited(&self) -> bool {
        matches!(self, Self::WorkerExited | Self::ChannelClosed)
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorkerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
