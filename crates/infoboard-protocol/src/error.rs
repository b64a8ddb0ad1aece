//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A `:`-separated field is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The hold field is not a number of seconds.
    #[error("invalid hold time: {0:?}")]
    InvalidHold(String),

    /// Payload exceeds [`MAX_PAYLOAD`](crate::MAX_PAYLOAD).
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Line exceeds [`MAX_LINE_LENGTH`](crate::MAX_LINE_LENGTH).
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },

    #[error("line is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Unknown reply line.
    #[error("unexpected reply: {0:?}")]
    UnexpectedReply(String),

    /// A field contains a character that would break framing.
    #[error("{field} must not contain {found:?}")]
    ForbiddenCharacter { field: &'static str, found: char },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation timed out.
    #[error("timeout during {operation}")]
    Timeout { operation: String },
}
