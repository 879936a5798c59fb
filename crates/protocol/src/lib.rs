//! Wire contract between the upload client and the conversion server.
//!
//! The server exposes two collaborator endpoints: one that ingests a file
//! one multipart chunk at a time, and one that converts a fully uploaded
//! file and answers with a locator for the result. This crate only names
//! the paths, form fields and JSON bodies; it performs no I/O.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{CONVERT_PATH, DOWNLOAD_PREFIX, UPLOAD_CHUNK_PATH};
pub use messages::{ChunkFields, ConversionRequest};
pub use types::{ChunkAck, ConversionResult, ServerErrorBody};
