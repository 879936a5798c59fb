use sha2::{Digest, Sha256};

use crate::TransferError;
use crate::source::UploadSource;
use crate::types::ChunkRange;

// ---------------------------------------------------------------------------
// Chunk geometry
// ---------------------------------------------------------------------------

/// Splits `file_size` bytes into fixed-size chunks.
///
/// Ranges are computed on demand; nothing is materialised up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkLayout {
    /// Creates a layout. `chunk_size` must be positive.
    pub fn new(file_size: u64, chunk_size: u64) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::InvalidChunkSize);
        }
        Ok(Self {
            file_size,
            chunk_size,
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// `ceil(file_size / chunk_size)`; zero for an empty file.
    pub fn total_chunks(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Byte range of chunk `index`, or `None` past the last chunk.
    pub fn range(&self, index: u64) -> Option<ChunkRange> {
        if index >= self.total_chunks() {
            return None;
        }
        let start = index * self.chunk_size;
        let end = start.saturating_add(self.chunk_size).min(self.file_size);
        Some(ChunkRange { index, start, end })
    }

    /// Iterates ranges starting at chunk `start`.
    pub fn ranges_from(&self, start: u64) -> ChunkRanges {
        ChunkRanges {
            layout: *self,
            next: start,
        }
    }

    /// Iterates every range of the file.
    pub fn ranges(&self) -> ChunkRanges {
        self.ranges_from(0)
    }
}

/// Lazy iterator over the ranges of a [`ChunkLayout`].
#[derive(Debug, Clone)]
pub struct ChunkRanges {
    layout: ChunkLayout,
    next: u64,
}

impl Iterator for ChunkRanges {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<ChunkRange> {
        let range = self.layout.range(self.next)?;
        self.next += 1;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.total_chunks().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ChunkRanges {}

/// Identifies a source by name, size and content.
///
/// Reads the source one chunk at a time, so memory stays at one chunk no
/// matter how large the file is. Used to key resume state: a file that
/// changed in any way gets a different fingerprint.
pub async fn fingerprint(
    source: &dyn UploadSource,
    layout: &ChunkLayout,
) -> Result<String, TransferError> {
    let mut hasher = Sha256::new();
    hasher.update(source.name().as_bytes());
    hasher.update([0u8]);
    hasher.update(layout.file_size().to_le_bytes());
    for range in layout.ranges() {
        let data = source.read_range(range).await?;
        hasher.update(&data);
    }
    Ok(hex::encode(hasher.finalize()))
}
