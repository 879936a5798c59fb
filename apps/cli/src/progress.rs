//! Upload progress display.

use indicatif::{ProgressBar, ProgressStyle};
use slideship_client::UploadEvent;
use tokio::sync::mpsc;

const TEMPLATE: &str =
    "{msg}\n[{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Progress bar fed by [`UploadEvent`]s.
pub struct UploadProgress {
    bar: ProgressBar,
}

impl UploadProgress {
    pub fn new(total_bytes: u64, file_name: &str) -> Self {
        let bar = ProgressBar::new(total_bytes);
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(format!("Uploading {file_name}"));
        Self { bar }
    }

    /// Applies one event to the bar.
    pub fn apply(&self, event: &UploadEvent) {
        match event {
            UploadEvent::Started {
                total_chunks,
                start_chunk,
                ..
            } if *start_chunk > 0 => {
                self.bar
                    .set_message(format!("Resuming at chunk {start_chunk}/{total_chunks}"));
            }
            UploadEvent::Started { .. } => {}
            UploadEvent::ChunkSent(report) => {
                // Resumed jobs skip chunks; position by share of the whole file.
                let pos = (report.percent / 100.0 * report.total_bytes as f64) as u64;
                self.bar.set_position(pos.min(report.total_bytes));
            }
            UploadEvent::Retrying {
                chunk_index,
                attempt,
                error,
                ..
            } => {
                self.bar
                    .set_message(format!("Chunk {chunk_index} failed (attempt {attempt}): {error}"));
            }
            UploadEvent::Completed { .. } => {
                self.bar.finish_with_message("Upload complete");
            }
            UploadEvent::Failed { error, .. } => {
                self.bar.abandon_with_message(format!("Upload failed: {error}"));
            }
        }
    }

    /// Drains `events` until the sender side is dropped.
    pub async fn run(self, mut events: mpsc::Receiver<UploadEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(&event);
        }
    }
}

/// Formats bytes in human-readable form.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.2} {}", UNITS[unit_idx])
    }
}
