use serde::{Deserialize, Serialize};

/// MIME type of OCR output.
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";

/// Result of running OCR over one image.
///
/// Mirrors the shape of Kreuzberg's general extraction result so it can be handed
/// straight to the rest of the pipeline. OCR never produces chunks; `chunks` is
/// always empty here and is populated downstream when chunking is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub mime_type: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

impl ExtractionResult {
    /// Build a plain-text result with no chunks.
    pub fn plain_text(content: String, metadata: Metadata) -> Self {
        Self {
            content,
            mime_type: PLAIN_TEXT_MIME_TYPE.to_string(),
            metadata,
            chunks: Vec::new(),
        }
    }
}

/// Image metadata attached to OCR output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub width: u32,
    pub height: u32,

    /// Mean recognition confidence over all emitted text boxes.
    ///
    /// `None` when no box contributed text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A text chunk with byte offsets into the parent content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub char_start: usize,
    pub char_end: usize,
}
