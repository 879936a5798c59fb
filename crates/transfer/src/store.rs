//! Resume state for interrupted uploads.
//!
//! By default nothing is persisted ([`NoopProgressStore`]) and a failed job
//! restarts from chunk 0. A persistent store remembers the next chunk to send,
//! keyed by the source fingerprint, so a later job for the same file can pick
//! up where the previous one stopped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TransferError;
use crate::chunked::ChunkLayout;

/// Where an interrupted job left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePoint {
    pub fingerprint: String,
    pub file_name: String,
    pub chunk_size: u64,
    pub total_chunks: u64,
    /// First chunk not yet acknowledged by the server.
    pub next_chunk: u64,
}

impl ResumePoint {
    /// Returns `true` if this point was recorded with the same chunk geometry.
    ///
    /// Resuming with a different geometry would make the server see two
    /// different total-chunk counts for one file, so such points are unusable.
    pub fn matches(&self, layout: &ChunkLayout) -> bool {
        self.chunk_size == layout.chunk_size()
            && self.total_chunks == layout.total_chunks()
            && self.next_chunk <= self.total_chunks
    }
}

/// Storage for [`ResumePoint`]s.
pub trait ProgressStore: Send + Sync {
    /// Loads the resume point for `fingerprint`, if any.
    fn load(&self, fingerprint: &str) -> Result<Option<ResumePoint>, TransferError>;

    /// Records `point`, replacing any previous one for the same fingerprint.
    fn save(&self, point: &ResumePoint) -> Result<(), TransferError>;

    /// Forgets the resume point for `fingerprint`.
    fn clear(&self, fingerprint: &str) -> Result<(), TransferError>;

    /// Whether saved points survive this store. Uploaders skip fingerprinting
    /// entirely when this is `false`.
    fn is_persistent(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// NoopProgressStore
// ---------------------------------------------------------------------------

/// Keeps nothing. Every job starts at chunk 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressStore;

impl ProgressStore for NoopProgressStore {
    fn load(&self, _fingerprint: &str) -> Result<Option<ResumePoint>, TransferError> {
        Ok(None)
    }

    fn save(&self, _point: &ResumePoint) -> Result<(), TransferError> {
        Ok(())
    }

    fn clear(&self, _fingerprint: &str) -> Result<(), TransferError> {
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// MemoryProgressStore
// ---------------------------------------------------------------------------

/// Process-local store, useful when one process retries the same file.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    points: Mutex<HashMap<String, ResumePoint>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, fingerprint: &str) -> Result<Option<ResumePoint>, TransferError> {
        let points = self.points.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(points.get(fingerprint).cloned())
    }

    fn save(&self, point: &ResumePoint) -> Result<(), TransferError> {
        let mut points = self.points.lock().unwrap_or_else(PoisonError::into_inner);
        points.insert(point.fingerprint.clone(), point.clone());
        Ok(())
    }

    fn clear(&self, fingerprint: &str) -> Result<(), TransferError> {
        let mut points = self.points.lock().unwrap_or_else(PoisonError::into_inner);
        points.remove(fingerprint);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileProgressStore
// ---------------------------------------------------------------------------

/// One `<fingerprint>.json` file per job inside a state directory.
#[derive(Debug, Clone)]
pub struct JsonFileProgressStore {
    dir: PathBuf,
}

impl JsonFileProgressStore {
    /// Uses `dir` for state files, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, TransferError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, fingerprint: &str) -> Result<PathBuf, TransferError> {
        if fingerprint.is_empty() || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TransferError::InvalidFileName(format!(
                "fingerprint must be hex: {fingerprint}"
            )));
        }
        Ok(self.dir.join(format!("{fingerprint}.json")))
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn load(&self, fingerprint: &str) -> Result<Option<ResumePoint>, TransferError> {
        let path = self.path_for(fingerprint)?;
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<ResumePoint>(&data) {
            Ok(point) => Ok(Some(point)),
            Err(e) => {
                // A torn write leaves garbage behind; treat it as no state.
                debug!(path = %path.display(), error = %e, "discarding unreadable resume state");
                Ok(None)
            }
        }
    }

    fn save(&self, point: &ResumePoint) -> Result<(), TransferError> {
        let path = self.path_for(&point.fingerprint)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(point)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear(&self, fingerprint: &str) -> Result<(), TransferError> {
        let path = self.path_for(fingerprint)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
