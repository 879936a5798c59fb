use serde::{Deserialize, Serialize};

use crate::constants::{chunk_field, convert_field};

// ---------------------------------------------------------------------------
// Chunk submission
// ---------------------------------------------------------------------------

/// Text fields sent alongside the raw bytes of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFields {
    pub index: u64,
    pub total_chunks: u64,
    pub filename: String,
}

impl ChunkFields {
    /// Returns the text fields in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (chunk_field::INDEX, self.index.to_string()),
            (chunk_field::TOTAL, self.total_chunks.to_string()),
            (chunk_field::FILENAME, self.filename.clone()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Conversion submission
// ---------------------------------------------------------------------------

/// Asks the server to convert a previously uploaded file.
///
/// Every field is forwarded verbatim. Interpreting `slide_numbers` or
/// `direction` is the server's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub filename: String,
    pub output_name: String,
    #[serde(default)]
    pub slide_numbers: String,
    #[serde(rename = "conversionDirection")]
    pub direction: String,
    /// Optional translation toggle. `None` leaves the field out entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<bool>,
}

impl ConversionRequest {
    /// Creates a request without a translation preference.
    pub fn new(
        filename: impl Into<String>,
        output_name: impl Into<String>,
        slide_numbers: impl Into<String>,
        direction: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            output_name: output_name.into(),
            slide_numbers: slide_numbers.into(),
            direction: direction.into(),
            translate: None,
        }
    }

    /// Sets the translation toggle.
    pub fn with_translation(mut self, enabled: bool) -> Self {
        self.translate = Some(enabled);
        self
    }

    /// Returns the form fields in submission order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (convert_field::FILENAME, self.filename.clone()),
            (convert_field::OUTPUT_NAME, self.output_name.clone()),
            (convert_field::SLIDE_NUMBERS, self.slide_numbers.clone()),
            (convert_field::DIRECTION, self.direction.clone()),
        ];
        if let Some(enabled) = self.translate {
            fields.push((convert_field::TRANSLATION_TOGGLE, enabled.to_string()));
        }
        fields
    }
}
