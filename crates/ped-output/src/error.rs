//! Error types for ped-output.

use thiserror::Error;

/// Errors that can occur while encoding, decoding, or streaming frames.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("address {0:?} did not resolve to any socket address")]
    Unresolved(String),

    #[error("unsupported protocol version {got}, expected {expected}")]
    Protocol { got: u32, expected: u32 },

    #[error("stream sender thread panicked")]
    SenderPanicked,
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
