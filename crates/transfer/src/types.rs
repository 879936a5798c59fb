use crate::chunked::{ChunkLayout, ChunkRanges};
use crate::progress::percent_complete;
use crate::{TransferError, validate_file_name};

/// A contiguous byte range of the source, transmitted as one request.
///
/// Derived on demand from a [`ChunkLayout`]; never carries the bytes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRange {
    /// 0-based chunk index.
    pub index: u64,
    /// First byte (inclusive).
    pub start: u64,
    /// Last byte (exclusive).
    pub end: u64,
}

impl ChunkRange {
    /// Number of bytes in this range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One complete attempt to upload a single file.
///
/// Created fresh for every upload call and never mutated afterwards; the
/// transmission loop keeps its own cursor and reads ranges from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    id: String,
    file_name: String,
    layout: ChunkLayout,
    start_chunk: u64,
}

impl UploadJob {
    /// Creates a job for a file of `file_size` bytes split into `chunk_size` pieces.
    pub fn new(file_name: &str, file_size: u64, chunk_size: u64) -> Result<Self, TransferError> {
        validate_file_name(file_name)?;
        let layout = ChunkLayout::new(file_size, chunk_size)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            layout,
            start_chunk: 0,
        })
    }

    /// Returns a copy of this job that starts at `next_chunk`.
    ///
    /// Values past the end are clamped to `total_chunks`.
    pub fn resumed_at(&self, next_chunk: u64) -> Self {
        Self {
            start_chunk: next_chunk.min(self.layout.total_chunks()),
            ..self.clone()
        }
    }

    /// Unique job identifier (uuid v4).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the file as it is announced to the server.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn file_size(&self) -> u64 {
        self.layout.file_size()
    }

    pub fn chunk_size(&self) -> u64 {
        self.layout.chunk_size()
    }

    pub fn total_chunks(&self) -> u64 {
        self.layout.total_chunks()
    }

    /// First chunk this job transmits (0 unless resumed).
    pub fn start_chunk(&self) -> u64 {
        self.start_chunk
    }

    /// Chunks this job still has to transmit.
    pub fn remaining_chunks(&self) -> u64 {
        self.total_chunks() - self.start_chunk
    }

    /// Lazily yields the ranges this job has to transmit, in order.
    pub fn pending(&self) -> ChunkRanges {
        self.layout.ranges_from(self.start_chunk)
    }

    /// Percentage reported once chunk `index` has been acknowledged.
    pub fn percent_after(&self, index: u64) -> f64 {
        percent_complete(index, self.total_chunks())
    }
}
