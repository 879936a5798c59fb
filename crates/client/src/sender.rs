//! Transport seam for single chunk submissions.

use std::future::Future;
use std::pin::Pin;

use reqwest::multipart::{Form, Part};
use slideship_protocol::constants::{CHUNK_CONTENT_TYPE, chunk_field};
use slideship_protocol::{ChunkAck, ChunkFields, ServerErrorBody};
use tracing::debug;

use crate::endpoints::Endpoints;
use crate::error::SendError;

/// Future returned by [`ChunkSender::send_chunk`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<ChunkAck, SendError>> + Send + 'a>>;

/// One chunk ready to go on the wire.
///
/// The payload owns its bytes; they are released as soon as the request that
/// carried them finishes.
#[derive(Debug, Clone)]
pub struct ChunkPayload {
    pub fields: ChunkFields,
    pub data: Vec<u8>,
}

/// Submits one chunk and waits for the server's acknowledgement.
///
/// A single call is one attempt. Retrying is the uploader's job.
pub trait ChunkSender: Send + Sync {
    fn send_chunk(&self, payload: ChunkPayload) -> SendFuture<'_>;
}

/// [`ChunkSender`] that posts multipart forms to the chunk-ingestion endpoint.
#[derive(Debug, Clone)]
pub struct HttpChunkSender {
    http: reqwest::Client,
    url: String,
}

impl HttpChunkSender {
    pub fn new(http: reqwest::Client, endpoints: &Endpoints) -> Self {
        Self {
            http,
            url: endpoints.chunk_url(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, payload: ChunkPayload) -> Result<ChunkAck, SendError> {
        let ChunkPayload { fields, data } = payload;
        let size = data.len();

        let file_part = Part::bytes(data)
            .file_name(fields.filename.clone())
            .mime_str(CHUNK_CONTENT_TYPE)?;
        let mut form = Form::new().part(chunk_field::FILE, file_part);
        for (name, value) in fields.form_fields() {
            form = form.text(name, value);
        }

        debug!(
            chunk = fields.index,
            total = fields.total_chunks,
            bytes = size,
            "posting chunk"
        );

        let resp = self.http.post(&self.url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(SendError::Status {
                status: status.as_u16(),
                message: ServerErrorBody::message_from(&String::from_utf8_lossy(&body)),
            });
        }

        Ok(ChunkAck::from_slice(&body)?)
    }
}

impl ChunkSender for HttpChunkSender {
    fn send_chunk(&self, payload: ChunkPayload) -> SendFuture<'_> {
        Box::pin(self.post(payload))
    }
}
