//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A `pass::` or `env::` reference could not be resolved.
    #[error("secret error: {0}")]
    Secret(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider error: {0}")]
    Provider(#[from] infoboard_providers::ProviderError),

    #[error("server error: {0}")]
    Server(#[from] infoboard_server::ServerError),

    #[error("protocol error: {0}")]
    Protocol(#[from] infoboard_protocol::ProtocolError),

    #[error("logging setup failed: {0}")]
    Tracing(#[from] infoboard_core::TracingError),

    /// Connection to the MOTD listener failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The MOTD listener answered `-`.
    #[error("message rejected by {0}")]
    Rejected(String),
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
