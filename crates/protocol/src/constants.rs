//! Endpoint paths and multipart field names.

/// Chunk-ingestion endpoint. One multipart POST per chunk.
pub const UPLOAD_CHUNK_PATH: &str = "/upload-chunk";

/// Conversion endpoint. One multipart POST per conversion.
pub const CONVERT_PATH: &str = "/convert";

/// Prefix of the locators the server hands back for converted files.
pub const DOWNLOAD_PREFIX: &str = "/download/";

/// Form fields of a chunk submission.
pub mod chunk_field {
    /// Raw chunk bytes.
    pub const FILE: &str = "file";
    /// 0-based chunk index, as decimal text.
    pub const INDEX: &str = "chunk";
    /// Total chunk count, as decimal text.
    pub const TOTAL: &str = "total";
    /// Original file name.
    pub const FILENAME: &str = "filename";
}

/// Form fields of a conversion submission.
pub mod convert_field {
    pub const FILENAME: &str = "filename";
    pub const OUTPUT_NAME: &str = "outputName";
    pub const SLIDE_NUMBERS: &str = "slideNumbers";
    pub const DIRECTION: &str = "conversionDirection";
    /// `"true"` enables text translation on top of the layout conversion.
    pub const TRANSLATION_TOGGLE: &str = "translationToggle";
}

/// Conversion direction values understood by the reference server.
///
/// The client never validates the direction; these exist so front ends can
/// offer sensible choices.
pub mod direction {
    pub const EN_TO_AR: &str = "en_to_ar";
    pub const AR_TO_EN: &str = "ar_to_en";

    /// All directions the reference server knows about.
    pub const KNOWN: [&str; 2] = [EN_TO_AR, AR_TO_EN];
}

/// MIME type used for the raw chunk part.
pub const CHUNK_CONTENT_TYPE: &str = "application/octet-stream";
