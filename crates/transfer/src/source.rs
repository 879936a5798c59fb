//! Byte-addressable sources an upload reads its chunks from.

use std::future::Future;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::types::ChunkRange;
use crate::{TransferError, validate_file_name};

/// Future returned by [`UploadSource::read_range`].
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + 'a>>;

/// A named source with a known total size.
///
/// Implementations hand out one range at a time so that at most one chunk
/// per in-flight request is resident in memory.
pub trait UploadSource: Send + Sync {
    /// File name announced to the server.
    fn name(&self) -> &str;

    /// Total size in bytes, fixed for the lifetime of the source.
    fn size(&self) -> u64;

    /// Reads exactly the bytes of `range`.
    fn read_range(&self, range: ChunkRange) -> SourceFuture<'_>;
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A file on disk.
///
/// The size is captured when the source is opened. Each read opens the file,
/// seeks to the range start and reads exactly the range, so reads are
/// independent of each other and may run concurrently.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
    size: u64,
}

impl FileSource {
    /// Opens `path`, using its final component as the announced name.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::open_as(path, &name).await
    }

    /// Opens `path` but announces it under `name`.
    pub async fn open_as(path: impl AsRef<Path>, name: &str) -> Result<Self, TransferError> {
        validate_file_name(name)?;
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(TransferError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }
        Ok(Self {
            path,
            name: name.to_string(),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UploadSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_range(&self, range: ChunkRange) -> SourceFuture<'_> {
        Box::pin(async move {
            let mut file = tokio::fs::File::open(&self.path).await?;
            file.seek(SeekFrom::Start(range.start)).await?;

            let mut buf = vec![0u8; range.len() as usize];
            let mut filled = 0;
            while filled < buf.len() {
                let n = file.read(&mut buf[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }

            if filled != buf.len() {
                return Err(TransferError::SourceChanged {
                    name: self.name.clone(),
                    offset: range.start,
                    expected: range.len(),
                    actual: filled as u64,
                });
            }
            Ok(buf)
        })
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// An in-memory buffer with a name.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

impl UploadSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&self, range: ChunkRange) -> SourceFuture<'_> {
        Box::pin(async move {
            let start = range.start as usize;
            let end = range.end as usize;
            match self.data.get(start..end) {
                Some(slice) => Ok(slice.to_vec()),
                None => Err(TransferError::SourceChanged {
                    name: self.name.clone(),
                    offset: range.start,
                    expected: range.len(),
                    actual: self.data.len().saturating_sub(start) as u64,
                }),
            }
        })
    }
}
