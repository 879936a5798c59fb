//! Chunked upload driver.
//!
//! Walks an [`UploadJob`] chunk by chunk, reading each range from the source
//! just before it is sent, retrying each chunk on its own budget, and reporting
//! progress after every acknowledgement.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use slideship_protocol::ChunkFields;
use slideship_transfer::{
    ChunkRange, NoopProgressStore, ProgressReport, ProgressStore, ResumePoint, UploadJob,
    UploadSource, fingerprint,
};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::UploadError;
use crate::sender::{ChunkPayload, ChunkSender};
use crate::types::{UploadEvent, UploadOutcome, UploaderConfig};

/// Uploads files through a [`ChunkSender`].
///
/// The uploader holds only configuration and shared collaborators. Each call
/// plans its own [`UploadJob`], so one instance may serve several uploads at
/// once.
///
/// Cancellation is instance wide: once the token fires, in-flight and future
/// uploads on this instance fail with [`UploadError::Cancelled`].
pub struct ChunkedUploader {
    sender: Arc<dyn ChunkSender>,
    config: UploaderConfig,
    store: Arc<dyn ProgressStore>,
    cancel: CancellationToken,
}

impl ChunkedUploader {
    pub fn new(sender: Arc<dyn ChunkSender>, config: UploaderConfig) -> Self {
        Self {
            sender,
            config,
            store: Arc::new(NoopProgressStore),
            cancel: CancellationToken::new(),
        }
    }

    /// Remembers progress in `store` so an interrupted upload can resume.
    pub fn with_store(mut self, store: Arc<dyn ProgressStore>) -> Self {
        self.store = store;
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a cancellation token for uploads on this instance.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Uploads `source`, calling `on_progress` with the percentage complete
    /// after every acknowledged chunk.
    ///
    /// Percentages are in `(0, 100]`, strictly increasing, and the last one is
    /// exactly `100.0`. An empty source succeeds without any request.
    pub async fn upload_file<F>(
        &self,
        source: &dyn UploadSource,
        on_progress: Option<F>,
    ) -> Result<UploadOutcome, UploadError>
    where
        F: FnMut(f64) + Send,
    {
        let mut on_progress = on_progress;
        let notifier = match on_progress.as_mut() {
            Some(f) => Notifier::Callback(f),
            None => Notifier::Silent,
        };
        self.run(source, notifier).await
    }

    /// Uploads `source`, reporting every step on `events`.
    ///
    /// A closed receiver does not stop the upload.
    pub async fn upload_with_events(
        &self,
        source: &dyn UploadSource,
        events: &mpsc::Sender<UploadEvent>,
    ) -> Result<UploadOutcome, UploadError> {
        self.run(source, Notifier::Events(events)).await
    }

    async fn run(
        &self,
        source: &dyn UploadSource,
        notifier: Notifier<'_>,
    ) -> Result<UploadOutcome, UploadError> {
        let state = Mutex::new(JobState::new(notifier));
        let result = self.execute(source, &state).await;

        let mut st = state.lock().await;
        match &result {
            Ok(outcome) => {
                info!(
                    job = %outcome.job_id,
                    file = %outcome.file_name,
                    chunks = outcome.chunks_sent,
                    bytes = outcome.bytes_sent,
                    "upload completed"
                );
                st.notifier
                    .event(UploadEvent::Completed {
                        job_id: outcome.job_id.clone(),
                        bytes_sent: outcome.bytes_sent,
                    })
                    .await;
            }
            Err(e) => {
                error!(file = %source.name(), error = %e, "upload failed");
                st.notifier
                    .event(UploadEvent::Failed {
                        chunk_index: e.chunk_index(),
                        error: e.to_string(),
                    })
                    .await;
            }
        }
        result
    }

    async fn execute(
        &self,
        source: &dyn UploadSource,
        state: &Mutex<JobState<'_>>,
    ) -> Result<UploadOutcome, UploadError> {
        if self.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let (job, key) = self.plan(source).await?;
        {
            let mut st = state.lock().await;
            st.chunks_done = job.start_chunk();
            st.next_unacked = job.start_chunk();
            st.notifier
                .event(UploadEvent::Started {
                    job_id: job.id().to_string(),
                    file_name: job.file_name().to_string(),
                    total_chunks: job.total_chunks(),
                    start_chunk: job.start_chunk(),
                })
                .await;
        }
        info!(
            job = %job.id(),
            file = %job.file_name(),
            size = job.file_size(),
            chunks = job.total_chunks(),
            start = job.start_chunk(),
            remaining = job.remaining_chunks(),
            "upload started"
        );

        let concurrency = self.config.dispatch.concurrency();
        let mut pending = job.pending();
        let mut in_flight = FuturesUnordered::new();
        loop {
            while in_flight.len() < concurrency {
                match pending.next() {
                    Some(range) => {
                        in_flight.push(self.send_chunk(source, &job, range, state, key.as_deref()))
                    }
                    None => break,
                }
            }
            match in_flight.next().await {
                Some(Ok(())) => {}
                Some(Err(e)) => {
                    // Once every chunk is acknowledged a cancel only cuts a pacing delay short.
                    let finished = matches!(e, UploadError::Cancelled)
                        && state.lock().await.chunks_done == job.total_chunks();
                    if !finished {
                        // Dropping the set aborts whatever else is still in flight.
                        return Err(e);
                    }
                }
                None => break,
            }
        }
        drop(in_flight);

        if let Some(key) = &key {
            if let Err(e) = self.store.clear(key) {
                warn!(job = %job.id(), error = %e, "failed to clear resume state");
            }
        }

        let st = state.lock().await;
        Ok(UploadOutcome {
            job_id: job.id().to_string(),
            file_name: job.file_name().to_string(),
            total_chunks: job.total_chunks(),
            chunks_sent: st.chunks_sent,
            bytes_sent: st.bytes_sent,
            resumed_from: (job.start_chunk() > 0).then_some(job.start_chunk()),
        })
    }

    /// Builds the job, picking up a stored resume point when one applies.
    async fn plan(
        &self,
        source: &dyn UploadSource,
    ) -> Result<(UploadJob, Option<String>), UploadError> {
        let job = UploadJob::new(source.name(), source.size(), self.config.chunk_size)?;
        if !self.store.is_persistent() || job.total_chunks() == 0 {
            return Ok((job, None));
        }

        let key = tokio::select! {
            _ = self.cancel.cancelled() => return Err(UploadError::Cancelled),
            key = fingerprint(source, job.layout()) => key?,
        };
        let job = match self.store.load(&key) {
            Ok(Some(point))
                if point.matches(job.layout()) && point.next_chunk < job.total_chunks() =>
            {
                info!(
                    file = %job.file_name(),
                    next_chunk = point.next_chunk,
                    total = job.total_chunks(),
                    "resuming upload"
                );
                job.resumed_at(point.next_chunk)
            }
            Ok(Some(point)) => {
                debug!(
                    file = %job.file_name(),
                    stored_chunk_size = point.chunk_size,
                    stored_total = point.total_chunks,
                    "discarding stale resume point"
                );
                if let Err(e) = self.store.clear(&key) {
                    warn!(error = %e, "failed to clear stale resume state");
                }
                job
            }
            Ok(None) => job,
            Err(e) => {
                warn!(error = %e, "failed to load resume state, starting over");
                job
            }
        };
        Ok((job, Some(key)))
    }

    /// Sends one chunk, retrying on its own budget, then pauses.
    async fn send_chunk(
        &self,
        source: &dyn UploadSource,
        job: &UploadJob,
        range: ChunkRange,
        state: &Mutex<JobState<'_>>,
        key: Option<&str>,
    ) -> Result<(), UploadError> {
        let max_attempts = self.config.retry.attempts();
        let mut attempts = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }

            let read = tokio::select! {
                _ = self.cancel.cancelled() => return Err(UploadError::Cancelled),
                read = source.read_range(range) => read,
            };
            let payload = ChunkPayload {
                fields: ChunkFields {
                    index: range.index,
                    total_chunks: job.total_chunks(),
                    filename: job.file_name().to_string(),
                },
                data: read?,
            };

            let result = tokio::select! {
                _ = self.cancel.cancelled() => return Err(UploadError::Cancelled),
                result = self.sender.send_chunk(payload) => result,
            };

            match result {
                Ok(_) => break,
                Err(e) => {
                    attempts += 1;
                    if attempts >= max_attempts {
                        error!(
                            job = %job.id(),
                            chunk = range.index,
                            attempts,
                            error = %e,
                            "chunk failed, giving up"
                        );
                        return Err(UploadError::ChunkExhausted {
                            chunk_index: range.index,
                            attempts,
                            source: e,
                        });
                    }

                    let delay = self.config.retry.delay_for_attempt(attempts);
                    warn!(
                        job = %job.id(),
                        chunk = range.index,
                        attempt = attempts,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "chunk failed, retrying"
                    );
                    state
                        .lock()
                        .await
                        .notifier
                        .event(UploadEvent::Retrying {
                            chunk_index: range.index,
                            attempt: attempts,
                            delay,
                            error: e.to_string(),
                        })
                        .await;
                    self.pause(delay).await?;
                }
            }
        }

        self.record_ack(job, range, state, key).await;
        self.pause(self.config.inter_chunk_delay).await
    }

    async fn record_ack(
        &self,
        job: &UploadJob,
        range: ChunkRange,
        state: &Mutex<JobState<'_>>,
        key: Option<&str>,
    ) {
        let mut guard = state.lock().await;
        let st = &mut *guard;

        st.chunks_done += 1;
        st.chunks_sent += 1;
        st.bytes_sent += range.len();

        // The resume point only moves over a contiguous acknowledged prefix.
        st.acked.insert(range.index);
        let before = st.next_unacked;
        while st.acked.remove(&st.next_unacked) {
            st.next_unacked += 1;
        }
        if let Some(key) = key.filter(|_| st.next_unacked > before) {
            let point = ResumePoint {
                fingerprint: key.to_string(),
                file_name: job.file_name().to_string(),
                chunk_size: job.chunk_size(),
                total_chunks: job.total_chunks(),
                next_chunk: st.next_unacked,
            };
            if let Err(e) = self.store.save(&point) {
                warn!(job = %job.id(), error = %e, "failed to save resume state");
            }
        }

        let report = ProgressReport {
            chunk_index: range.index,
            chunks_done: st.chunks_done,
            total_chunks: job.total_chunks(),
            percent: job.percent_after(st.chunks_done - 1),
            bytes_sent: st.bytes_sent,
            total_bytes: job.file_size(),
        };
        debug!(
            job = %job.id(),
            chunk = range.index,
            percent = format_args!("{:.1}", report.percent),
            "chunk acknowledged"
        );
        st.notifier.progress(report).await;
    }

    async fn pause(&self, delay: Duration) -> Result<(), UploadError> {
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(UploadError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

/// Where progress goes for one upload call.
enum Notifier<'a> {
    Silent,
    Callback(&'a mut (dyn FnMut(f64) + Send)),
    Events(&'a mpsc::Sender<UploadEvent>),
}

impl Notifier<'_> {
    async fn progress(&mut self, report: ProgressReport) {
        match self {
            Notifier::Silent => {}
            Notifier::Callback(f) => f(report.percent),
            Notifier::Events(tx) => {
                let _ = tx.send(UploadEvent::ChunkSent(report)).await;
            }
        }
    }

    async fn event(&self, event: UploadEvent) {
        if let Notifier::Events(tx) = self {
            let _ = tx.send(event).await;
        }
    }
}

/// Mutable bookkeeping for one upload call.
struct JobState<'a> {
    notifier: Notifier<'a>,
    /// Acknowledged chunks, counting ones skipped by a resume.
    chunks_done: u64,
    chunks_sent: u64,
    bytes_sent: u64,
    /// Acknowledged chunks above `next_unacked`.
    acked: BTreeSet<u64>,
    next_unacked: u64,
}

impl<'a> JobState<'a> {
    fn new(notifier: Notifier<'a>) -> Self {
        Self {
            notifier,
            chunks_done: 0,
            chunks_sent: 0,
            bytes_sent: 0,
            acked: BTreeSet::new(),
            next_unacked: 0,
        }
    }
}
