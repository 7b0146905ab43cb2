//! Text that needs no OCR: PDF text layers and plain-text documents.

use tracing::debug;

use super::{Recognizer, RecognizerOutput, Resolution};
use crate::error::RecognitionError;
use crate::models::document::{Document, MediaType};
use crate::pdf::{PdfExtractor, PdfProcessor};

const ENGINE_ID: &str = "embedded_text";

/// Reads the text layer of digital PDFs, or plain text as is.
#[derive(Debug, Default)]
pub struct EmbeddedTextRecognizer;

impl EmbeddedTextRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Recognizer for EmbeddedTextRecognizer {
    fn engine_id(&self) -> &str {
        ENGINE_ID
    }

    fn supports(&self, media_type: MediaType) -> bool {
        matches!(media_type, MediaType::Pdf | MediaType::PlainText)
    }

    fn renders(&self) -> bool {
        false
    }

    fn recognize(
        &self,
        document: &Document,
        _resolution: Resolution,
    ) -> Result<RecognizerOutput, RecognitionError> {
        let text = match document.media_type() {
            MediaType::PlainText => String::from_utf8_lossy(document.bytes()).into_owned(),
            MediaType::Pdf => {
                let pdf = PdfExtractor::from_bytes(document.bytes()).map_err(|e| {
                    RecognitionError::Engine {
                        engine: ENGINE_ID.to_string(),
                        message: e.to_string(),
                    }
                })?;
                pdf.extract_text().map_err(|e| RecognitionError::Engine {
                    engine: ENGINE_ID.to_string(),
                    message: e.to_string(),
                })?
            }
            other => return Err(RecognitionError::UnsupportedMedia(other)),
        };

        debug!("Embedded text: {} chars", text.len());
        Ok(RecognizerOutput::new(ENGINE_ID, text))
    }
}
