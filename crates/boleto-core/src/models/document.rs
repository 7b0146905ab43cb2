//! Input documents.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BoletoError, Result};

/// Declared media type of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// PDF, digital or scanned.
    Pdf,
    /// Raster image (PNG, JPEG, TIFF...).
    Image,
    /// Text that is already machine-readable.
    PlainText,
}

impl MediaType {
    /// Guess the media type from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "pdf" => Some(MediaType::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" | "gif" => Some(MediaType::Image),
            "txt" | "text" => Some(MediaType::PlainText),
            _ => None,
        }
    }

    /// Detect the media type from magic bytes, falling back to UTF-8 text.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if let Some(kind) = infer::get(bytes) {
            if kind.mime_type() == "application/pdf" {
                return Some(MediaType::Pdf);
            }
            if kind.matcher_type() == infer::MatcherType::Image {
                return Some(MediaType::Image);
            }
            return None;
        }
        if !bytes.is_empty() && std::str::from_utf8(bytes).is_ok() {
            return Some(MediaType::PlainText);
        }
        None
    }

    /// PDFs and images may need rendering at several resolutions.
    pub fn is_image_bearing(&self) -> bool {
        matches!(self, MediaType::Pdf | MediaType::Image)
    }
}

/// Opaque document bytes plus their media type.
///
/// The pipeline never mutates a document. `BoletoPipeline::extract` takes it
/// by value and drops it once a transcript exists.
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Vec<u8>,
    media_type: MediaType,
}

impl Document {
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self { bytes, media_type }
    }

    /// Build a document from bytes, detecting the media type.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let media_type = MediaType::sniff(&bytes).ok_or_else(|| {
            BoletoError::UnsupportedDocument("unrecognized file signature".to_string())
        })?;
        Ok(Self::new(bytes, media_type))
    }

    /// Read a document from disk. Magic bytes win over the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let from_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaType::from_extension);

        let media_type = MediaType::sniff(&bytes).or(from_ext).ok_or_else(|| {
            BoletoError::UnsupportedDocument(format!("{}", path.display()))
        })?;
        Ok(Self::new(bytes, media_type))
    }

    /// Wrap an already available transcript.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text.into().into_bytes(), MediaType::PlainText)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_pdf_and_text() {
        assert_eq!(MediaType::sniff(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n"), Some(MediaType::Pdf));
        assert_eq!(MediaType::sniff("Vencimento 10/10/2030".as_bytes()), Some(MediaType::PlainText));
        assert_eq!(MediaType::sniff(&[]), None);
    }

    #[test]
    fn test_sniff_png() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(MediaType::sniff(&png), Some(MediaType::Image));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(MediaType::from_extension("PDF"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_extension("jpeg"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("txt"), Some(MediaType::PlainText));
        assert_eq!(MediaType::from_extension("docx"), None);
    }

    #[test]
    fn test_from_text() {
        let doc = Document::from_text("abc");
        assert_eq!(doc.media_type(), MediaType::PlainText);
        assert_eq!(doc.bytes(), b"abc");
        assert!(!doc.media_type().is_image_bearing());
    }
}
