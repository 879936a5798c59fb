/// Percentage complete once chunk `index` (0-based) of `total` is acknowledged.
///
/// `((index + 1) / total) * 100`. The last chunk yields exactly `100.0`.
/// A job with no chunks is trivially complete.
pub fn percent_complete(index: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let done = (index + 1).min(total);
    (done as f64 / total as f64) * 100.0
}

/// Progress snapshot emitted after a chunk is acknowledged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    /// Chunk that was just acknowledged.
    pub chunk_index: u64,
    /// Chunks acknowledged so far, including ones skipped by a resume.
    pub chunks_done: u64,
    pub total_chunks: u64,
    /// In `(0, 100]`, strictly increasing within one job.
    pub percent: f64,
    pub bytes_sent: u64,
    pub total_bytes: u64,
}
