//! Conversion request issued once every chunk is acknowledged.

use std::path::Path;

use reqwest::multipart::Form;
use slideship_protocol::{ConversionRequest, ConversionResult, ServerErrorBody};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::endpoints::Endpoints;
use crate::error::ConversionError;

/// Asks the server to convert an uploaded file and fetches the result.
///
/// Stateless between calls. Nothing here is retried: a failed conversion is
/// reported once and the caller decides what to do.
#[derive(Debug, Clone)]
pub struct ConversionTrigger {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ConversionTrigger {
    pub fn new(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Submits `request` and returns the server's result descriptor.
    pub async fn request_conversion(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        let mut form = Form::new();
        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }

        info!(
            file = %request.filename,
            output = %request.output_name,
            direction = %request.direction,
            "requesting conversion"
        );

        let resp = self
            .http
            .post(self.endpoints.convert_url())
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            return Err(ConversionError::Status {
                status: status.as_u16(),
                message: ServerErrorBody::message_from(&String::from_utf8_lossy(&body)),
            });
        }

        let result: ConversionResult = serde_json::from_slice(&body)?;
        debug!(download_url = ?result.download_locator(), "conversion finished");
        Ok(result)
    }

    /// Streams the file at `locator` into `dest`, returning the bytes written.
    ///
    /// Data lands in a sibling `.part` file that is renamed over `dest` only
    /// once the whole body has arrived.
    pub async fn download(&self, locator: &str, dest: &Path) -> Result<u64, ConversionError> {
        if locator.trim().is_empty() {
            return Err(ConversionError::InvalidLocator(locator.to_string()));
        }
        let url = self.endpoints.resolve(locator);

        let mut resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ConversionError::Status {
                status: status.as_u16(),
                message: ServerErrorBody::message_from(&body),
            });
        }

        let part = part_path(dest);
        let mut file = tokio::fs::File::create(&part).await?;
        let mut written = 0u64;
        let copied: Result<(), ConversionError> = async {
            while let Some(chunk) = resp.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
        tokio::fs::rename(&part, dest).await?;

        info!(url = %url, dest = %dest.display(), bytes = written, "downloaded converted file");
        Ok(written)
    }
}

fn part_path(dest: &Path) -> std::path::PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
