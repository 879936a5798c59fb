//! Upload and conversion error types.

use slideship_transfer::TransferError;

/// One failed transmission attempt.
///
/// Absorbed by the retry loop until the chunk's attempts run out.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server rejected chunk with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid acknowledgement: {0}")]
    InvalidAck(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Terminal failure of a whole upload job.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to upload chunk {chunk_index} after {attempts} attempts: {source}")]
    ChunkExhausted {
        chunk_index: u64,
        attempts: u32,
        #[source]
        source: SendError,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("source error: {0}")]
    Source(#[from] TransferError),
}

impl UploadError {
    /// Index of the chunk that exhausted its retries, if that is what failed.
    pub fn chunk_index(&self) -> Option<u64> {
        match self {
            UploadError::ChunkExhausted { chunk_index, .. } => Some(*chunk_index),
            _ => None,
        }
    }
}

/// Failure of a conversion request or result download. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("conversion failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid conversion response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid download locator: {0}")]
    InvalidLocator(String),
}
