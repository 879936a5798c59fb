//! Chunk geometry, upload sources and progress accounting.
//!
//! Everything here is transport agnostic: the HTTP side lives in
//! `slideship-client`, which drives an [`UploadJob`] over an
//! [`UploadSource`] one [`ChunkRange`] at a time.

mod chunked;
mod progress;
mod source;
mod store;
mod types;
mod validation;

pub use chunked::{ChunkLayout, ChunkRanges, fingerprint};
pub use progress::{ProgressReport, percent_complete};
pub use source::{FileSource, MemorySource, SourceFuture, UploadSource};
pub use store::{
    JsonFileProgressStore, MemoryProgressStore, NoopProgressStore, ProgressStore, ResumePoint,
};
pub use types::{ChunkRange, UploadJob};
pub use validation::validate_file_name;

/// Default chunk size: 2 MiB.
///
/// Bounds peak memory per in-flight chunk while keeping per-request overhead
/// small relative to the payload.
pub const DEFAULT_CHUNK_SIZE: u64 = 2 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("source {name} changed during upload: expected {expected} bytes at offset {offset}, got {actual}")]
    SourceChanged {
        name: String,
        offset: u64,
        expected: u64,
        actual: u64,
    },
}
