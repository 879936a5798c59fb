//! Data types for the upload flow.

use std::num::NonZeroUsize;
use std::time::Duration;

use slideship_transfer::{DEFAULT_CHUNK_SIZE, ProgressReport};

use crate::retry::RetryPolicy;

/// How chunks are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// One chunk in flight, strictly in index order.
    #[default]
    Sequential,
    /// Up to N chunks in flight at once.
    BoundedParallel(NonZeroUsize),
}

impl DispatchPolicy {
    /// Builds a policy from a configured concurrency; `0` and `1` are sequential.
    pub fn from_concurrency(n: usize) -> Self {
        match NonZeroUsize::new(n) {
            Some(n) if n.get() > 1 => DispatchPolicy::BoundedParallel(n),
            _ => DispatchPolicy::Sequential,
        }
    }

    /// Maximum chunks in flight.
    pub fn concurrency(&self) -> usize {
        match self {
            DispatchPolicy::Sequential => 1,
            DispatchPolicy::BoundedParallel(n) => n.get(),
        }
    }
}

/// Tunables for a [`ChunkedUploader`](crate::ChunkedUploader).
#[derive(Debug, Clone, PartialEq)]
pub struct UploaderConfig {
    /// Bytes per chunk; every chunk but the last is exactly this long.
    pub chunk_size: u64,
    pub retry: RetryPolicy,
    /// Pause after each acknowledged chunk.
    pub inter_chunk_delay: Duration,
    pub dispatch: DispatchPolicy,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
            inter_chunk_delay: Duration::from_millis(100),
            dispatch: DispatchPolicy::Sequential,
        }
    }
}

/// Events emitted during an upload.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// The job is planned and about to send its first chunk.
    Started {
        job_id: String,
        file_name: String,
        total_chunks: u64,
        start_chunk: u64,
    },
    /// A chunk was acknowledged.
    ChunkSent(ProgressReport),
    /// An attempt failed and the chunk will be sent again after `delay`.
    Retrying {
        chunk_index: u64,
        attempt: u32,
        delay: Duration,
        error: String,
    },
    /// Every chunk was acknowledged.
    Completed { job_id: String, bytes_sent: u64 },
    /// The job stopped. `chunk_index` is set when a chunk ran out of attempts.
    Failed {
        chunk_index: Option<u64>,
        error: String,
    },
}

/// Summary of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub job_id: String,
    pub file_name: String,
    pub total_chunks: u64,
    /// Chunks sent by this call; excludes chunks skipped by a resume.
    pub chunks_sent: u64,
    pub bytes_sent: u64,
    /// First chunk sent by this call, when it picked up an earlier job.
    pub resumed_from: Option<u64>,
}
