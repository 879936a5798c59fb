use serde::{Deserialize, Serialize};

/// Acknowledgement body returned for an accepted chunk.
///
/// Its fields belong to the server; the client only requires that it is
/// well-formed JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkAck(pub serde_json::Value);

impl ChunkAck {
    /// Parses an acknowledgement body, checking only that it is valid JSON.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Self)
    }
}

/// Result descriptor of a successful conversion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Where the converted file can be fetched from, usually a
    /// server-relative path under [`DOWNLOAD_PREFIX`](crate::DOWNLOAD_PREFIX).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Any other fields the server chose to include.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ConversionResult {
    /// The locator of the converted file, if the server returned one.
    pub fn download_locator(&self) -> Option<&str> {
        self.download_url.as_deref().filter(|s| !s.is_empty())
    }
}

/// Error body the server sends with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServerErrorBody {
    /// Extracts a human-readable message from an error response body.
    ///
    /// Falls back to the trimmed raw body when it is not the JSON error shape.
    pub fn message_from(body: &str) -> String {
        match serde_json::from_str::<ServerErrorBody>(body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            _ => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ack_accepts_any_json() {
        assert!(ChunkAck::from_slice(br#"{"received":3}"#).is_ok());
        assert!(ChunkAck::from_slice(b"[]").is_ok());
        assert!(ChunkAck::from_slice(b"null").is_ok());
    }

    #[test]
    fn chunk_ack_rejects_non_json() {
        assert!(ChunkAck::from_slice(b"<html>ok</html>").is_err());
        assert!(ChunkAck::from_slice(b"").is_err());
    }

    #[test]
    fn conversion_result_locator() {
        let res: ConversionResult =
            serde_json::from_str(r#"{"status":"completed","download_url":"/x"}"#).unwrap();
        assert_eq!(res.download_locator(), Some("/x"));
        assert_eq!(res.status.as_deref(), Some("completed"));
        assert!(res.extra.is_empty());
    }

    #[test]
    fn conversion_result_without_locator() {
        let res: ConversionResult = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(res.download_locator(), None);

        let empty: ConversionResult = serde_json::from_str(r#"{"download_url":""}"#).unwrap();
        assert_eq!(empty.download_locator(), None);
    }

    #[test]
    fn conversion_result_keeps_extra_fields() {
        let res: ConversionResult =
            serde_json::from_str(r#"{"download_url":"/x","pages":12}"#).unwrap();
        assert_eq!(res.extra.get("pages"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn error_message_prefers_json_message() {
        let msg = ServerErrorBody::message_from(r#"{"status":"error","message":"No output name provided"}"#);
        assert_eq!(msg, "No output name provided");
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(ServerErrorBody::message_from("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(ServerErrorBody::message_from(r#"{"status":"error"}"#), r#"{"status":"error"}"#);
    }
}
