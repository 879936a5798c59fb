//! Chunked upload client and conversion trigger.
//!
//! This crate implements the **client side** of a chunked upload protocol:
//! a large file is split into fixed-size byte ranges, each range is sent as
//! an independent multipart request with bounded per-chunk retry, and once
//! every chunk is acknowledged a separate request asks the server to convert
//! the reassembled file.
//!
//! # Pipeline
//!
//! 1. **Plan**: derive the chunk layout and an immutable [`UploadJob`]
//! 2. **Upload**: send chunks through a [`ChunkSender`], retrying each one
//!    up to [`RetryPolicy::max_attempts`] times
//! 3. **Convert**: call [`ConversionTrigger::request_conversion`]
//! 4. **Download**: optionally fetch the returned locator
//!
//! [`UploadJob`]: slideship_transfer::UploadJob

pub mod conversion;
pub mod endpoints;
pub mod error;
pub mod retry;
pub mod sender;
pub mod types;
pub mod uploader;

#[cfg(test)]
mod test_support;

// Re-export primary types for convenience.
pub use conversion::ConversionTrigger;
pub use endpoints::{Endpoints, build_http_client};
pub use error::{ConversionError, SendError, UploadError};
pub use retry::RetryPolicy;
pub use sender::{ChunkPayload, ChunkSender, HttpChunkSender, SendFuture};
pub use types::{DispatchPolicy, UploadEvent, UploadOutcome, UploaderConfig};
pub use uploader::ChunkedUploader;
