//! Error types shared by the relay
//!
//! Every fallible operation in the library returns [`RelayResult`]. The
//! launcher converts these into `anyhow` errors at the process boundary.

use thiserror::Error;

/// Errors that can occur while tracking, encoding, or streaming
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Client disconnected")]
    ClientDisconnected,

    #[error("Stream ended mid-message: expected {expected} bytes, got {received}")]
    TruncatedMessage { expected: usize, received: usize },

    #[error("Message too large: {0} > {1}")]
    MessageTooLarge(usize, usize),

    #[error("Encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Tracker error: {0}")]
    Tracker(String),

    #[error("Tracker feed closed")]
    TrackerClosed,

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl RelayError {
    /// Whether this error means the peer went away rather than something broke
    pub fn is_disconnect(&self) -> bool {
        match self {
            RelayError::ClientDisconnected | RelayError::TruncatedMessage { .. } => true,
            RelayError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
