//! IRC protocol errors.

use thiserror::Error;

use crate::error::RelayError;

/// Errors raised while parsing or framing IRC lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty message")]
    EmptyMessage,

    #[error("missing command in '{0}'")]
    MissingCommand(String),

    #[error("line break inside outgoing message")]
    LineBreak,

    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong { actual: usize, limit: usize },
}

impl From<ProtocolError> for RelayError {
    fn from(err: ProtocolError) -> Self {
        RelayError::IrcProtocolError(err.to_string())
    }
}
