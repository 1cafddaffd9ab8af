use std::io;

use thiserror::Error;

use crate::protocol::BlockError;

/// Why an operation came back without a snapshot.
///
/// None of these poison the session: the next operation is attempted as
/// normal. Once the engine process has actually exited, every later
/// operation fails the same way until [`close`](crate::EngineSession::close).
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("failed to write {line:?} to engine: {source}")]
    WriteFailure {
        line: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out after {received} of {expected} board rows")]
    Timeout { received: usize, expected: usize },
    #[error("engine output closed after {received} of {expected} board rows")]
    StreamClosed { received: usize, expected: usize },
    #[error("malformed block: {0}")]
    Malformed(#[from] BlockError),
    #[error("session is closed")]
    SessionClosed,
}

impl ExchangeError {
    /// Board rows that arrived before the operation gave up.
    pub fn received(&self) -> usize {
        match self {
            ExchangeError::Timeout { received, .. } | ExchangeError::StreamClosed { received, .. } => {
                *received
            }
            _ => 0,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ExchangeError::WriteFailure { .. } => "write_failure",
            ExchangeError::Timeout { .. } => "timeout",
            ExchangeError::StreamClosed { .. } => "stream_closed",
            ExchangeError::Malformed(_) => "malformed",
            ExchangeError::SessionClosed => "session_closed",
        }
    }
}
