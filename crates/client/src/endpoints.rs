//! Server location and the shared HTTP client.

use std::time::Duration;

use slideship_protocol::{CONVERT_PATH, UPLOAD_CHUNK_PATH};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5005";

/// Where the chunk-ingestion and conversion endpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    chunk_path: String,
    convert_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Endpoints {
    /// Uses the standard paths under `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            chunk_path: UPLOAD_CHUNK_PATH.to_string(),
            convert_path: CONVERT_PATH.to_string(),
        }
    }

    /// Overrides the chunk-ingestion path.
    pub fn with_chunk_path(mut self, path: &str) -> Self {
        self.chunk_path = path.to_string();
        self
    }

    /// Overrides the conversion path.
    pub fn with_convert_path(mut self, path: &str) -> Self {
        self.convert_path = path.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chunk_url(&self) -> String {
        self.join(&self.chunk_path)
    }

    pub fn convert_url(&self) -> String {
        self.join(&self.convert_path)
    }

    /// Turns a locator returned by the server into a full URL.
    ///
    /// Absolute `http(s)://` locators pass through untouched.
    pub fn resolve(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            locator.to_string()
        } else {
            self.join(locator)
        }
    }

    fn join(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Builds the HTTP client shared by the chunk sender and the conversion trigger.
///
/// `timeout` bounds each whole request; `None` keeps the transport default.
pub fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("slideship/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}
